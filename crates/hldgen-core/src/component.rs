use serde::{Deserialize, Serialize};

/// A Fabrikate component definition (`component.yaml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub subcomponents: Vec<Subcomponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcomponent {
    pub name: String,
    pub method: String,
    pub source: String,
    pub path: String,
}
