use std::collections::HashMap;

use super::calculator::StateCalculator;
use super::states;

/// Registry of [`StateCalculator`] instances, keyed by state code and tax
/// year.
///
/// Typical lifetime:
/// 1. Create with `StateCalculatorRegistry::new()` or
///    [`with_builtin_states`](Self::with_builtin_states).
/// 2. Call `register` once per additional calculator.
/// 3. Wrap in an `Arc` and hand it to a
///    [`StateTaxEngine`](super::StateTaxEngine); it is read-only from then on.
pub struct StateCalculatorRegistry {
    calculators: HashMap<(String, i32), Box<dyn StateCalculator>>,
}

impl StateCalculatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            calculators: HashMap::new(),
        }
    }

    /// Registry holding every built-in calculator.
    pub fn with_builtin_states() -> Self {
        let mut registry = Self::new();
        for calculator in states::builtin() {
            registry.register(calculator);
        }
        registry
    }

    /// Register a calculator under its own state code and tax year.
    ///
    /// A calculator already present for the same state and year is
    /// replaced.
    pub fn register(
        &mut self,
        calculator: Box<dyn StateCalculator>,
    ) {
        let key = (calculator.state_code().to_ascii_uppercase(), calculator.tax_year());
        self.calculators.insert(key, calculator);
    }

    pub fn get(
        &self,
        state_code: &str,
        tax_year: i32,
    ) -> Option<&dyn StateCalculator> {
        self.calculators
            .get(&(state_code.to_ascii_uppercase(), tax_year))
            .map(|calculator| calculator.as_ref())
    }

    /// Every registered `(state, year)`, sorted.
    pub fn available(&self) -> Vec<(String, i32)> {
        let mut keys: Vec<_> = self.calculators.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}

impl Default for StateCalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateCalculatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCalculatorRegistry")
            .field("calculators", &self.available())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::state::StateTaxConfig;

    struct FlatCalculator(StateTaxConfig);

    impl StateCalculator for FlatCalculator {
        fn config(&self) -> &StateTaxConfig {
            &self.0
        }
    }

    fn flat(
        code: &str,
        year: i32,
    ) -> Box<dyn StateCalculator> {
        Box::new(FlatCalculator(StateTaxConfig::flat(code, year, dec!(0.05))))
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = StateCalculatorRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.get("IL", 2025).is_none());
    }

    #[test]
    fn lookup_is_by_state_and_year() {
        let mut registry = StateCalculatorRegistry::new();
        registry.register(flat("ZZ", 2025));

        assert!(registry.get("ZZ", 2025).is_some());
        assert!(registry.get("zz", 2025).is_some());
        assert!(registry.get("ZZ", 2024).is_none());
    }

    #[test]
    fn register_replaces_same_key() {
        let mut registry = StateCalculatorRegistry::new();
        registry.register(flat("ZZ", 2025));
        registry.register(Box::new(FlatCalculator(StateTaxConfig::flat(
            "ZZ",
            2025,
            dec!(0.07),
        ))));

        assert_eq!(registry.len(), 1);
        let rate = registry.get("ZZ", 2025).unwrap().config().brackets.single.brackets()[0].tax_rate;
        assert_eq!(rate, dec!(0.07));
    }

    #[test]
    fn builtin_states_cover_both_years() {
        let registry = StateCalculatorRegistry::with_builtin_states();

        let available = registry.available();
        for code in ["AZ", "CA", "CO", "GA", "IL", "MA", "MI", "NC", "NY", "PA"] {
            assert!(available.contains(&(code.to_string(), 2025)), "{code} 2025 missing");
        }
        assert!(available.contains(&("IL".to_string(), 2024)));
        assert!(available.contains(&("PA".to_string(), 2024)));
    }

    #[test]
    fn builtin_configs_validate() {
        let registry = StateCalculatorRegistry::with_builtin_states();

        for (code, year) in registry.available() {
            let calculator = registry.get(&code, year).unwrap();
            assert_eq!(calculator.config().validate(), Ok(()), "{code} {year}");
        }
    }
}
