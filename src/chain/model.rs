use serde_json::Value;

use crate::{
    effects::params::{EffectKind, EffectParams},
    foundation::error::{MoshError, MoshResult},
};

/// One configured effect in a chain. `kind` is fixed at creation.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectInstance {
    pub id: String,
    pub active: bool,
    pub params: EffectParams,
}

impl EffectInstance {
    pub fn kind(&self) -> EffectKind {
        self.params.kind()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Ordered effect list. A `3d-mesh` instance, when present, is always last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectChain {
    effects: Vec<EffectInstance>,
    next_id: u64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ChainDoc {
    #[serde(default)]
    effects: Vec<EffectEntry>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct EffectEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    params: Value,
}

fn default_active() -> bool {
    true
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a chain document: `{ "effects": [ { "id", "type", "active", "params" } ] }`.
    ///
    /// Unknown `type`s, duplicate ids and more than one `3d-mesh` are errors. Params are
    /// parsed leniently; a mesh entry anywhere in the list is moved to the end.
    pub fn from_json_str(s: &str) -> MoshResult<Self> {
        let doc: ChainDoc = serde_json::from_str(s)?;
        let mut chain = Self::new();
        for entry in doc.effects {
            let kind: EffectKind = entry.kind.parse()?;
            // Entries without an id stay blank until every explicit id is known.
            let id = match entry.id {
                Some(id) if id.trim().is_empty() => {
                    return Err(MoshError::config("effect id must be non-empty"));
                }
                Some(id) if chain.position(&id).is_some() => {
                    return Err(MoshError::config(format!("duplicate effect id '{id}'")));
                }
                Some(id) => id,
                None => String::new(),
            };
            chain.effects.push(EffectInstance {
                id,
                active: entry.active,
                params: EffectParams::from_json(kind, &entry.params),
            });
        }
        for i in 0..chain.effects.len() {
            if chain.effects[i].id.is_empty() {
                let kind = chain.effects[i].kind();
                chain.effects[i].id = chain.fresh_id(kind);
            }
        }

        let pinned = chain.effects.iter().filter(|e| e.kind().is_pinned_last()).count();
        if pinned > 1 {
            return Err(MoshError::config("a chain holds at most one 3d-mesh effect"));
        }
        if let Some(i) = chain.effects.iter().position(|e| e.kind().is_pinned_last()) {
            let mesh = chain.effects.remove(i);
            chain.effects.push(mesh);
        }
        Ok(chain)
    }

    pub fn to_json_string(&self) -> MoshResult<String> {
        let doc = ChainDoc {
            effects: self
                .effects
                .iter()
                .map(|e| EffectEntry {
                    id: Some(e.id.clone()),
                    kind: e.kind().as_str().to_owned(),
                    active: e.active,
                    params: e.params.to_json(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn effects(&self) -> &[EffectInstance] {
        &self.effects
    }

    pub fn get(&self, id: &str) -> Option<&EffectInstance> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Active instances in chain order.
    pub fn iter_enabled(&self) -> impl Iterator<Item = &EffectInstance> {
        self.effects.iter().filter(|e| e.active)
    }

    /// Append a default-configured instance of `kind` and return its id.
    ///
    /// New instances go in front of an existing `3d-mesh`; a new `3d-mesh` replaces the
    /// old one and lands at the end.
    pub fn add(&mut self, kind: EffectKind) -> String {
        let id = self.fresh_id(kind);
        let inst = EffectInstance {
            id: id.clone(),
            active: true,
            params: EffectParams::default_for(kind),
        };
        if kind.is_pinned_last() {
            self.effects.retain(|e| !e.kind().is_pinned_last());
            self.effects.push(inst);
        } else {
            let at = self
                .effects
                .iter()
                .position(|e| e.kind().is_pinned_last())
                .unwrap_or(self.effects.len());
            self.effects.insert(at, inst);
        }
        id
    }

    /// Shallow-merge `patch` into the instance's params and reparse them.
    ///
    /// A `type` key in the patch is ignored. Returns `false` for an unknown id.
    pub fn update(&mut self, id: &str, patch: &Value) -> bool {
        let Some(inst) = self.effects.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        let mut merged = inst.params.to_json();
        if let (Some(dst), Some(src)) = (merged.as_object_mut(), patch.as_object()) {
            for (k, v) in src {
                if k != "type" {
                    dst.insert(k.clone(), v.clone());
                }
            }
        }
        inst.params = EffectParams::from_json(inst.kind(), &merged);
        true
    }

    /// Replace params wholesale. Refused when the id is unknown or the kind differs.
    pub fn replace_params(&mut self, id: &str, params: EffectParams) -> bool {
        match self.effects.iter_mut().find(|e| e.id == id) {
            Some(inst) if inst.kind() == params.kind() => {
                inst.params = params;
                true
            }
            _ => false,
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        match self.effects.iter_mut().find(|e| e.id == id) {
            Some(inst) => {
                inst.active = !inst.active;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<EffectInstance> {
        let i = self.position(id)?;
        Some(self.effects.remove(i))
    }

    /// Swap with the neighbour in `dir`.
    ///
    /// Refused when either side is pinned or the move leaves the list.
    pub fn reorder(&mut self, id: &str, dir: Direction) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        let j = match dir {
            Direction::Up => i.checked_sub(1),
            Direction::Down => Some(i + 1).filter(|&j| j < self.effects.len()),
        };
        let Some(j) = j else {
            return false;
        };
        if self.effects[i].kind().is_pinned_last() || self.effects[j].kind().is_pinned_last() {
            return false;
        }
        self.effects.swap(i, j);
        true
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.effects.iter().position(|e| e.id == id)
    }

    fn fresh_id(&mut self, kind: EffectKind) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{}-{}", kind.as_str(), self.next_id);
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/model.rs"]
mod tests;
