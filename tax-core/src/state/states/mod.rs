//! Built-in state calculators.
//!
//! States whose rules fit [`StateTaxConfig`] alone use
//! [`StandardCalculator`]; the rest implement their own hooks.

use super::calculator::StateCalculator;
use super::config::StateTaxConfig;

pub mod arizona;
pub mod california;
pub mod colorado;
pub mod georgia;
pub mod illinois;
pub mod massachusetts;
pub mod michigan;
pub mod new_york;
pub mod north_carolina;
pub mod pennsylvania;

/// A calculator driven entirely by its config.
#[derive(Debug, Clone)]
pub struct StandardCalculator {
    config: StateTaxConfig,
}

impl StandardCalculator {
    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }
}

impl StateCalculator for StandardCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }
}

/// Every built-in calculator, for every year it is defined.
pub fn builtin() -> Vec<Box<dyn StateCalculator>> {
    vec![
        Box::new(arizona::ArizonaCalculator::new(arizona::config_2025())),
        Box::new(california::CaliforniaCalculator::new(
            california::config_2025(),
            california::rules_2025(),
        )),
        Box::new(colorado::ColoradoCalculator::new(colorado::config_2025())),
        Box::new(StandardCalculator::new(georgia::config_2025())),
        Box::new(illinois::IllinoisCalculator::new(illinois::config_2024())),
        Box::new(illinois::IllinoisCalculator::new(illinois::config_2025())),
        Box::new(massachusetts::MassachusettsCalculator::new(
            massachusetts::config_2025(),
            massachusetts::SURTAX_THRESHOLD_2025,
        )),
        Box::new(StandardCalculator::new(michigan::config_2025())),
        Box::new(new_york::NewYorkCalculator::new(new_york::config_2025())),
        Box::new(StandardCalculator::new(north_carolina::config_2025())),
        Box::new(pennsylvania::PennsylvaniaCalculator::new(pennsylvania::config(2024))),
        Box::new(pennsylvania::PennsylvaniaCalculator::new(pennsylvania::config(2025))),
    ]
}
