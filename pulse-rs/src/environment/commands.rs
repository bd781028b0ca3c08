use std::collections::BTreeSet;
use std::fmt;

use crate::ast::{
    Command, Component, Group, Item, Node, RepeatCount, Value, ValuePath, VariableKind,
};
use crate::program::Program;
use crate::units::{Dimension, Quantity};

use super::{AnalysisError, Environment};

impl Environment {
    /// Check the timeline and count acquisitions.
    pub(super) fn check_commands(&mut self, program: &Program) {
        self.acquisitions = 0;
        self.check_nodes(program.body());
    }

    fn check_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            if let Node::Command(command) = node {
                self.check_command(command);
            }
        }
    }

    fn check_command(&mut self, command: &Command) {
        match command {
            Command::Acquire => self.acquisitions += 1,
            Command::BareDelay(quantity) => self.check_delay(*quantity, command),
            Command::Statement(statement) => {
                for component in &statement.components {
                    match component {
                        Component::Name(name) => self.check_timed_name(name, command),
                        Component::Delay(quantity) => self.check_delay(*quantity, command),
                        Component::Parallel(groups) => self.check_parallel(groups, command),
                    }
                }
            }
            Command::Repeat(repeat) => {
                let header = format!("times {}", repeat.count);
                self.check_repeat_count(&repeat.count, &header);
                self.check_nodes(&repeat.body);
            }
        }
    }

    fn check_parallel(&mut self, groups: &[Group], node: &dyn fmt::Display) {
        let mut claimed = BTreeSet::new();
        for group in groups {
            for item in &group.items {
                match item {
                    Item::Name(name) => self.check_timed_name(name, node),
                    Item::Delay(quantity) => self.check_delay(*quantity, node),
                }
            }
            for output in &group.outputs {
                if self.variables.get(output) != Some(&VariableKind::Output) {
                    self.record(
                        AnalysisError::NotAnOutput {
                            name: output.clone(),
                        },
                        node,
                    );
                } else if !claimed.insert(output.as_str()) {
                    self.record(
                        AnalysisError::DelayMultiplyUsed {
                            name: output.clone(),
                        },
                        node,
                    );
                }
            }
        }
    }

    fn check_timed_name(&mut self, name: &str, node: &dyn fmt::Display) {
        if !matches!(
            self.variables.get(name),
            Some(VariableKind::Delay | VariableKind::Pulse)
        ) {
            self.record(
                AnalysisError::NotADelayOrPulse {
                    name: name.to_owned(),
                },
                node,
            );
        }
    }

    fn check_delay(&mut self, quantity: Quantity, node: &dyn fmt::Display) {
        if !quantity.has_dimension(Dimension::Time) {
            self.record(AnalysisError::NotATime { quantity }, node);
        }
    }

    /// A count bound to a variable is only checked once the variable has a value.
    fn check_repeat_count(&mut self, count: &RepeatCount, node: &dyn fmt::Display) {
        let value = match count {
            RepeatCount::Literal(count) => *count,
            RepeatCount::Variable(name) => {
                if self.variables.get(name) != Some(&VariableKind::Int) {
                    self.record(AnalysisError::RepeatNotInt { name: name.clone() }, node);
                    return;
                }
                match self.values.get(&ValuePath::new(name.as_str())) {
                    Some(Value::Integer(count)) => *count,
                    _ => return,
                }
            }
        };
        if value < 0 {
            self.record(AnalysisError::NegativeRepeat { count: value }, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use crate::environment::{AnalysisError, Environment, Stage};
    use crate::Program;

    fn checked(source: &str) -> Environment {
        let program = Program::from_str(source).unwrap();
        let mut env = Environment::default();
        env.run(Stage::Declarations, &program).unwrap();
        env.run(Stage::Values, &program).unwrap();
        env.clear_errors();
        env.run(Stage::Commands, &program).unwrap();
        env
    }

    #[test]
    fn valid_timeline() {
        let env = checked(
            "int repeat = 2
            delay abc1 = 100 ns, def2
            pulse ghi1, jkl2 = {shape: 'square'}
            output mno1, pqr2

            abc1
            (10 ns):pqr2
            times repeat {
                def2
                ghi1:mno1
                (ghi1 abc1 10 ns jkl2):mno1 (def2 jkl2 def2):pqr2
            }
            acquire
            5 ns",
        );
        assert!(env.errors().is_empty(), "{:?}", env.errors());
        assert_eq!(env.acquisitions(), 1);
        assert!(env.has_acquisition());
    }

    #[test]
    fn invalid_timeline() {
        let env = checked(
            "int repeat = 2, minus = -3
            delay abc1 = 100 ns, def2
            pulse ghi1, jkl2 = {shape: 'square'}
            output mno1, pqr2

            times repeat {
                ghi1:mno1
                acquire
                mno1
            }
            acquire
            times ghi1 {}
            times -1 {}
            times minus {}
            (abc1):mno1 (def2):mno1,xyz
            acquire
            5 ns 1 A
            2 V",
        );
        let errors: Vec<_> = env.errors().iter().map(|d| d.error.clone()).collect();
        assert_eq!(
            errors,
            vec![
                AnalysisError::NotADelayOrPulse {
                    name: "mno1".to_owned()
                },
                AnalysisError::RepeatNotInt {
                    name: "ghi1".to_owned()
                },
                AnalysisError::NegativeRepeat { count: -1 },
                AnalysisError::NegativeRepeat { count: -3 },
                AnalysisError::DelayMultiplyUsed {
                    name: "mno1".to_owned()
                },
                AnalysisError::NotAnOutput {
                    name: "xyz".to_owned()
                },
                AnalysisError::NotATime {
                    quantity: "1 A".parse().unwrap()
                },
                AnalysisError::NotATime {
                    quantity: "2 V".parse().unwrap()
                },
            ]
        );
        assert_eq!(env.acquisitions(), 3);
        assert_eq!(env.errors()[2].node, "times -1");
    }

    #[test]
    fn rerun_resets_acquisitions() {
        let program = Program::from_str("acquire\nacquire\n").unwrap();
        let mut env = Environment::default();
        env.run_all(&program).unwrap_err();
        env.run(Stage::Commands, &program).unwrap();
        assert_eq!(env.acquisitions(), 2);
    }
}
