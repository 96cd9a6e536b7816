// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unbounded ordered list of standing instructions.

use std::sync::RwLock;

use ragchat_core::RagError;
use tracing::info;

/// Selects one instruction to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionSelector {
    Index(usize),
    /// Removes the first instruction equal to this text.
    Value(String),
}

impl InstructionSelector {
    /// Build a selector from exactly one of `idx` or `command`.
    pub fn from_parts(idx: Option<usize>, command: Option<&str>) -> Result<Self, RagError> {
        match (idx, command) {
            (Some(i), None) => Ok(Self::Index(i)),
            (None, Some(c)) => Ok(Self::Value(c.to_string())),
            (Some(_), Some(_)) => Err(RagError::InvalidArgument(
                "choose either an index or an instruction to delete, not both".into(),
            )),
            (None, None) => Err(RagError::InvalidArgument(
                "an index or an instruction to delete is required".into(),
            )),
        }
    }
}

/// Standing instructions read fresh on every chat turn.
#[derive(Debug, Default)]
pub struct LongTermMemory {
    instructions: RwLock<Vec<String>>,
}

impl LongTermMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instructions(instructions: Vec<String>) -> Self {
        Self {
            instructions: RwLock::new(instructions),
        }
    }

    pub fn add(&self, instruction: impl Into<String>) -> Result<(), RagError> {
        let instruction = instruction.into();
        self.write()?.push(instruction.clone());
        info!(instruction = %instruction, "added instruction");
        Ok(())
    }

    /// Remove one instruction and return it. Remaining order is preserved.
    pub fn delete(&self, selector: InstructionSelector) -> Result<String, RagError> {
        let mut instructions = self.write()?;
        let idx = match &selector {
            InstructionSelector::Index(i) if *i < instructions.len() => *i,
            InstructionSelector::Index(i) => {
                return Err(RagError::NotFound(format!(
                    "no instruction at index {i} (len {})",
                    instructions.len()
                )));
            }
            InstructionSelector::Value(v) => instructions
                .iter()
                .position(|inst| inst == v)
                .ok_or_else(|| RagError::NotFound(format!("instruction `{v}` not found")))?,
        };
        let removed = instructions.remove(idx);
        info!(idx, instruction = %removed, "deleted instruction");
        Ok(removed)
    }

    /// Delete by index XOR by value.
    pub fn delete_by(&self, idx: Option<usize>, command: Option<&str>) -> Result<String, RagError> {
        self.delete(InstructionSelector::from_parts(idx, command)?)
    }

    /// Snapshot of all instructions in order.
    pub fn get(&self) -> Result<Vec<String>, RagError> {
        Ok(self
            .instructions
            .read()
            .map_err(|_| RagError::Internal("instruction lock poisoned".into()))?
            .clone())
    }

    pub fn len(&self) -> usize {
        self.instructions.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<String>>, RagError> {
        self.instructions
            .write()
            .map_err(|_| RagError::Internal("instruction lock poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn memory(items: &[&str]) -> LongTermMemory {
        LongTermMemory::with_instructions(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn add_appends_in_order() {
        let mem = LongTermMemory::new();
        mem.add("first").unwrap();
        mem.add("second").unwrap();
        mem.add("first").unwrap();
        assert_eq!(mem.get().unwrap(), vec!["first", "second", "first"]);
    }

    #[test]
    fn delete_by_value_removes_first_occurrence() {
        let mem = memory(&["a", "b", "a", "c"]);
        assert_eq!(mem.delete_by(None, Some("a")).unwrap(), "a");
        assert_eq!(mem.get().unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn delete_requires_exactly_one_selector() {
        let mem = memory(&["a"]);
        assert!(matches!(
            mem.delete_by(Some(0), Some("a")),
            Err(RagError::InvalidArgument(_))
        ));
        assert!(matches!(
            mem.delete_by(None, None),
            Err(RagError::InvalidArgument(_))
        ));
        assert_eq!(mem.get().unwrap(), vec!["a"]);
    }

    #[test]
    fn delete_miss_is_not_found() {
        let mem = memory(&["a"]);
        assert!(matches!(mem.delete_by(Some(3), None), Err(RagError::NotFound(_))));
        assert!(matches!(mem.delete_by(None, Some("z")), Err(RagError::NotFound(_))));
    }

    #[test]
    fn get_is_idempotent() {
        let mem = memory(&["x", "y"]);
        assert_eq!(mem.get().unwrap(), mem.get().unwrap());
    }

    proptest! {
        #[test]
        fn delete_index_preserves_rest(
            items in proptest::collection::vec("[a-z]{1,6}", 1..20),
            pick in any::<proptest::sample::Index>(),
        ) {
            let i = pick.index(items.len());
            let mem = LongTermMemory::with_instructions(items.clone());
            let removed = mem.delete(InstructionSelector::Index(i)).unwrap();

            let mut expected = items.clone();
            let want = expected.remove(i);
            prop_assert_eq!(removed, want);
            prop_assert_eq!(mem.get().unwrap(), expected);
        }
    }
}
