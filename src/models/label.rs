// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label vocabulary.
//!
//! A label has a name, a display colour and the pointer gesture that
//! assigns it. The set of labels is fixed at startup and validated once.

use crate::error::AnnotatorError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An RGB colour, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

/// Pointer gestures the canvas reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    PrimaryClick,
    DoubleClick,
    MiddleClick,
    /// Reserved: always removes the label under the pointer.
    SecondaryClick,
}

impl InputKind {
    pub fn describe(&self) -> &'static str {
        match self {
            InputKind::PrimaryClick => "left click",
            InputKind::DoubleClick => "double click",
            InputKind::MiddleClick => "middle click",
            InputKind::SecondaryClick => "right click",
        }
    }
}

/// A pointer gesture at a position in mosaic pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub x: f64,
    pub y: f64,
}

/// One entry of the label vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    pub color: Rgb,
    pub trigger: InputKind,
}

impl LabelSpec {
    pub fn new(name: &str, color: [u8; 3], trigger: InputKind) -> Self {
        Self {
            name: name.to_string(),
            color: Rgb(color),
            trigger,
        }
    }
}

/// Validated, ordered label vocabulary with lookup by name and by gesture.
#[derive(Debug, Clone)]
pub struct LabelSet {
    specs: Vec<LabelSpec>,
    by_name: HashMap<String, usize>,
    by_trigger: HashMap<InputKind, usize>,
}

impl LabelSet {
    /// Build the vocabulary. Names and triggers must be unique, and no label
    /// may claim the removal gesture.
    pub fn new(specs: Vec<LabelSpec>) -> Result<Self, AnnotatorError> {
        if specs.is_empty() {
            return Err(AnnotatorError::Vocabulary("no labels defined".to_string()));
        }

        let mut by_name = HashMap::new();
        let mut by_trigger = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(AnnotatorError::Vocabulary(format!("label {} has an empty name", i)));
            }
            if spec.trigger == InputKind::SecondaryClick {
                return Err(AnnotatorError::Vocabulary(format!(
                    "'{}' uses {}, which is reserved for removing labels",
                    spec.name,
                    spec.trigger.describe()
                )));
            }
            if by_name.insert(spec.name.clone(), i).is_some() {
                return Err(AnnotatorError::Vocabulary(format!("duplicate label '{}'", spec.name)));
            }
            if let Some(other) = by_trigger.insert(spec.trigger, i) {
                return Err(AnnotatorError::Vocabulary(format!(
                    "'{}' and '{}' are both bound to {}",
                    specs[other].name,
                    spec.name,
                    spec.trigger.describe()
                )));
            }
        }

        Ok(Self { specs, by_name, by_trigger })
    }

    /// The vocabulary used when no label file is given.
    pub fn default_vocabulary() -> Result<Self, AnnotatorError> {
        Self::new(vec![
            LabelSpec::new("walking", [0, 200, 0], InputKind::PrimaryClick),
            LabelSpec::new("sitting", [200, 0, 0], InputKind::DoubleClick),
            LabelSpec::new("standing", [255, 140, 0], InputKind::MiddleClick),
        ])
    }

    pub fn get(&self, name: &str) -> Result<&LabelSpec, AnnotatorError> {
        self.by_name
            .get(name)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| AnnotatorError::UnknownLabel(name.to_string()))
    }

    pub fn color_of(&self, name: &str) -> Result<Rgb, AnnotatorError> {
        self.get(name).map(|spec| spec.color)
    }

    /// The label assigned by `kind`, if any.
    pub fn for_trigger(&self, kind: InputKind) -> Option<&LabelSpec> {
        self.by_trigger.get(&kind).map(|&i| &self.specs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }
}
