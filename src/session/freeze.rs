use indexmap::IndexMap;

/// Per-variable reference counts. A variable with a positive count is
/// externally observed and must survive engine-side elimination.
#[derive(Debug, Clone, Default)]
pub struct FreezeTable {
    counts: IndexMap<u32, u32>,
}

impl FreezeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count; true on the unfrozen-to-frozen transition.
    pub fn freeze(&mut self, var: u32) -> bool {
        let count = self.counts.entry(var).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Decrements the count, saturating at zero; true when the variable
    /// becomes unfrozen. Melting below zero is a caller contract breach.
    pub fn melt(&mut self, var: u32) -> bool {
        match self.counts.get_mut(&var) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.counts.shift_remove(&var);
                true
            }
            None => {
                debug_assert!(false, "melt of variable {var} with zero count");
                false
            }
        }
    }

    pub fn frozen(&self, var: u32) -> bool {
        self.counts.get(&var).is_some_and(|&c| c > 0)
    }
}
