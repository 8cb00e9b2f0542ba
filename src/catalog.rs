use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};

/// One marker class: a display name and its color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub rgb: [u8; 3],
}

impl ClassDef {
    pub fn new(name: impl Into<String>, rgb: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            rgb,
        }
    }

    /// Color as `[r, g, b]` in `0.0..=1.0`.
    pub fn normalized(&self) -> [f32; 3] {
        self.rgb.map(|c| c as f32 / 255.0)
    }
}

/// Ordered, immutable set of classes. Names are unique.
///
/// Built once at startup and shared (behind an `Arc`) by every component that
/// needs class names or colors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClassDef>", into = "Vec<ClassDef>")]
pub struct ClassCatalog {
    classes: Vec<ClassDef>,
}

impl ClassCatalog {
    pub fn new(classes: Vec<ClassDef>) -> Result<Self> {
        if classes.is_empty() {
            return Err(TaggerError::InvalidCatalog("no classes defined".into()));
        }
        for (i, class) in classes.iter().enumerate() {
            if class.name.trim().is_empty() {
                return Err(TaggerError::InvalidCatalog(format!(
                    "class {i} has an empty name"
                )));
            }
            if classes[..i].iter().any(|c| c.name == class.name) {
                return Err(TaggerError::InvalidCatalog(format!(
                    "duplicate class name {:?}",
                    class.name
                )));
            }
        }
        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ClassDef> {
        self.classes.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter()
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<&ClassDef> {
        self.classes.get(index).ok_or(TaggerError::UnknownClass {
            index,
            len: self.classes.len(),
        })
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self {
            classes: vec![
                ClassDef::new("Verde", [0, 255, 0]),
                ClassDef::new("Rojo", [255, 0, 0]),
                ClassDef::new("Azul", [0, 0, 255]),
            ],
        }
    }
}

impl TryFrom<Vec<ClassDef>> for ClassCatalog {
    type Error = TaggerError;

    fn try_from(classes: Vec<ClassDef>) -> Result<Self> {
        Self::new(classes)
    }
}

impl From<ClassCatalog> for Vec<ClassDef> {
    fn from(catalog: ClassCatalog) -> Self {
        catalog.classes
    }
}
