//! Shared fixtures for integration tests
//!
//! Builds XGBoost JSON model artifacts by hand so tests never depend on a
//! trained model file.

#![allow(dead_code)]

use medrisk::ml::{RiskEngine, TreeEnsemble, FEATURE_NAMES};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

/// One node of a hand-written tree
#[derive(Debug, Clone, Copy)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: i64,
        right: i64,
        default_left: bool,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

pub fn split(
    feature: &str,
    threshold: f64,
    left: i64,
    right: i64,
    default_left: bool,
    cover: f64,
) -> Node {
    let feature = FEATURE_NAMES
        .iter()
        .position(|name| *name == feature)
        .unwrap_or_else(|| panic!("unknown feature {}", feature));
    Node::Split {
        feature,
        threshold,
        left,
        right,
        default_left,
        cover,
    }
}

pub fn leaf(value: f64, cover: f64) -> Node {
    Node::Leaf { value, cover }
}

/// A tree in XGBoost's columnar JSON layout
pub fn tree_json(nodes: &[Node]) -> Value {
    let mut left_children = Vec::new();
    let mut right_children = Vec::new();
    let mut split_indices = Vec::new();
    let mut split_conditions = Vec::new();
    let mut default_left = Vec::new();
    let mut sum_hessian = Vec::new();

    for node in nodes {
        match *node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
                default_left: dl,
                cover,
            } => {
                left_children.push(left);
                right_children.push(right);
                split_indices.push(feature as i64);
                split_conditions.push(threshold);
                default_left.push(i64::from(dl));
                sum_hessian.push(cover);
            }
            Node::Leaf { value, cover } => {
                left_children.push(-1);
                right_children.push(-1);
                split_indices.push(0);
                split_conditions.push(value);
                default_left.push(0);
                sum_hessian.push(cover);
            }
        }
    }

    json!({
        "left_children": left_children,
        "right_children": right_children,
        "split_indices": split_indices,
        "split_conditions": split_conditions,
        "default_left": default_left,
        "sum_hessian": sum_hessian,
        "split_type": vec![0; nodes.len()],
    })
}

/// A complete model document
pub fn model_json(trees: Vec<Value>, base_score: &str, with_feature_names: bool) -> String {
    let feature_names: Vec<&str> = if with_feature_names {
        FEATURE_NAMES.to_vec()
    } else {
        Vec::new()
    };
    let n_trees = trees.len();

    json!({
        "learner": {
            "attributes": {},
            "feature_names": feature_names,
            "feature_types": [],
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "gbtree_model_param": {
                        "num_trees": n_trees.to_string(),
                        "num_parallel_tree": "1"
                    },
                    "tree_info": vec![0; n_trees],
                    "trees": trees
                }
            },
            "learner_model_param": {
                "base_score": base_score,
                "boost_from_average": "1",
                "num_class": "0",
                "num_feature": "15",
                "num_target": "1"
            },
            "objective": {
                "name": "reg:squarederror",
                "reg_loss_param": { "scale_pos_weight": "1" }
            }
        },
        "version": [2, 0, 3]
    })
    .to_string()
}

/// Three small trees over sepsis/age, albumin and prior admissions/CHF.
///
/// base_score 2.5; expected value 2.5 + 1.45 + 0.44 + 0.7 = 5.09.
pub fn clinical_model_json() -> String {
    let sepsis_age = tree_json(&[
        split("hasSepsis", 0.5, 1, 2, true, 100.0),
        split("age", 65.0, 3, 4, true, 70.0),
        leaf(4.0, 30.0),
        leaf(-0.5, 40.0),
        leaf(1.5, 30.0),
    ]);
    let albumin = tree_json(&[
        split("albumin", 3.0, 1, 2, false, 100.0),
        leaf(2.0, 35.0),
        leaf(-0.4, 65.0),
    ]);
    let admissions_chf = tree_json(&[
        split("priorAdmissions", 2.0, 1, 2, true, 100.0),
        leaf(0.0, 60.0),
        split("hasCHF", 0.5, 3, 4, true, 40.0),
        leaf(1.0, 25.0),
        leaf(3.0, 15.0),
    ]);

    model_json(vec![sepsis_age, albumin, admissions_chf], "[2.5E0]", true)
}

pub const CLINICAL_EXPECTED_VALUE: f64 = 5.09;

pub fn clinical_ensemble() -> TreeEnsemble {
    TreeEnsemble::from_xgboost_json(&clinical_model_json()).unwrap()
}

pub fn clinical_engine() -> RiskEngine {
    RiskEngine::from_ensemble(clinical_ensemble()).unwrap()
}

/// Write a model document to a temporary file
pub fn write_model(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Septic, elderly, low albumin, frequent admissions with CHF: raw 11.5
pub fn high_risk_patient() -> Value {
    json!({
        "patientId": "P-1001",
        "patientName": "Ada Moss",
        "admissionDate": "2024-05-02",
        "age": 78,
        "admissionType": 1,
        "priorAdmissions": 3,
        "surgeryMethod": 0,
        "albumin": 2.5,
        "hemoglobin": 9.8,
        "hasSepsis": true,
        "hasDelirium": false,
        "hasMalignancy": false,
        "hasDiabetes": true,
        "hasCHF": true,
        "hasCKD": false,
        "hasCOPD": false,
        "hasStroke": false,
        "hasLiverDisease": false
    })
}

/// Older, low albumin, frequent admissions without CHF: raw 7.0
pub fn moderate_risk_patient() -> Value {
    json!({
        "patientId": "P-1002",
        "patientName": "Ben Ortiz",
        "admissionDate": "2024-05-01",
        "age": 70,
        "priorAdmissions": 3,
        "albumin": 2.5,
        "hasSepsis": false,
        "hasCHF": false
    })
}

/// Younger, healthy albumin, first admission: raw 1.6
pub fn low_risk_patient() -> Value {
    json!({
        "patientId": "P-1003",
        "patientName": "Cleo Park",
        "admissionDate": "2024-04-20",
        "age": 40,
        "priorAdmissions": 0,
        "albumin": 4.0,
        "hasSepsis": 0,
        "hasCHF": 0
    })
}

pub fn as_object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}
