use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;

use crate::ast::{Command, Initializer, Node, Value, ValuePath, VariableKind};
use crate::program::Program;
use crate::units::Dimension;

use super::{AnalysisError, Environment, LookupError};

/// How [`Environment::write_value`] treats a name which was never declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Record a diagnostic, as the values stage does for assignments in the program.
    Record,
    /// Fail with a [`LookupError`], for values supplied from outside the program.
    Raise,
}

const PULSE_ATTRIBUTES: [&str; 3] = ["amplitude", "length", "shape"];

impl Environment {
    pub(super) fn bind_values(&mut self, program: &Program) {
        self.values.clear();
        self.missing_values = required_paths(&self.variables, program.contains_acquire());
        self.bind_nodes(program.body(), false);
        for path in self.missing_values.clone() {
            self.record(AnalysisError::MustAssign { path: path.clone() }, &path);
        }
    }

    fn bind_nodes(&mut self, nodes: &[Node], in_loop: bool) {
        for node in nodes {
            match node {
                // Loop declarations are reported by the declarations stage.
                Node::Declaration(_) if in_loop => {}
                Node::Declaration(declaration) => {
                    for declared in &declaration.names {
                        match &declared.initializer {
                            None => {}
                            Some(Initializer::Value(value)) => self.bind(
                                ValuePath::new(declared.name.as_str()),
                                value,
                                declaration,
                            ),
                            Some(Initializer::Attributes(attributes)) => {
                                for (attribute, value) in attributes {
                                    self.bind(
                                        ValuePath::attribute(declared.name.as_str(), attribute),
                                        value,
                                        declaration,
                                    );
                                }
                            }
                        }
                    }
                }
                Node::Assignment(assignment) if in_loop => self.record(
                    AnalysisError::AssignmentInLoop {
                        path: assignment.path.clone(),
                    },
                    assignment,
                ),
                Node::Assignment(assignment) => {
                    self.bind(assignment.path.clone(), &assignment.value, assignment)
                }
                Node::Command(Command::Repeat(repeat)) => self.bind_nodes(&repeat.body, true),
                Node::Command(_) => {}
            }
        }
    }

    fn bind(&mut self, path: ValuePath, value: &Value, node: &dyn fmt::Display) {
        // Record mode reports every problem as a diagnostic.
        let _ = self.write_value(path, value.clone(), WriteMode::Record, node);
    }

    /// Check `value` against the declared kind of `path` and bind it.
    ///
    /// Values of the wrong type are recorded as diagnostics and not bound. Binding a value
    /// removes its path from the missing values.
    pub(crate) fn write_value(
        &mut self,
        path: ValuePath,
        value: Value,
        mode: WriteMode,
        node: &dyn fmt::Display,
    ) -> Result<(), LookupError> {
        let Some(kind) = self.variables.get(&path.name).copied() else {
            return match mode {
                WriteMode::Raise => Err(LookupError { path }),
                WriteMode::Record => {
                    self.record(AnalysisError::Undeclared { name: path.name }, node);
                    Ok(())
                }
            };
        };

        if let Err(error) = check_value(kind, &path, &value, &self.variables) {
            self.record(error, node);
            return Ok(());
        }

        if mode == WriteMode::Record && self.values.contains_key(&path) {
            self.record(AnalysisError::Reassignment { path: path.clone() }, node);
        }
        if self.missing_values.remove(&path) {
            // The value is no longer missing, so neither is its diagnostic.
            self.errors.retain(|diagnostic| match &diagnostic.error {
                AnalysisError::MustAssign { path: missing } => *missing != path,
                _ => true,
            });
        }
        self.values.insert(path, value);
        Ok(())
    }
}

/// The values which every declared name needs.
fn required_paths(
    variables: &IndexMap<String, VariableKind>,
    acquires: bool,
) -> BTreeSet<ValuePath> {
    let mut paths = BTreeSet::new();
    for (name, kind) in variables {
        match kind {
            VariableKind::Int | VariableKind::Delay => {
                paths.insert(ValuePath::new(name.as_str()));
            }
            VariableKind::Pulse => {
                paths.extend(
                    PULSE_ATTRIBUTES
                        .iter()
                        .map(|attribute| ValuePath::attribute(name.as_str(), *attribute)),
                );
            }
            VariableKind::AcqMarker if acquires => {
                paths.insert(ValuePath::attribute(name.as_str(), "num"));
                paths.insert(ValuePath::attribute(name.as_str(), "output"));
            }
            VariableKind::AcqMarker | VariableKind::Output => {}
        }
    }
    paths
}

fn check_value(
    kind: VariableKind,
    path: &ValuePath,
    value: &Value,
    variables: &IndexMap<String, VariableKind>,
) -> Result<(), AnalysisError> {
    let cannot_assign = |reason: String| AnalysisError::CannotAssign {
        path: path.clone(),
        reason,
    };
    let expect = |valid: bool, expected: &str| {
        if valid {
            Ok(())
        } else {
            Err(cannot_assign(format!(
                "expected {expected}, found {}",
                value.describe()
            )))
        }
    };
    let unrecognized = || {
        Err(AnalysisError::UnrecognizedAttribute { path: path.clone() })
    };

    match (kind, path.attribute.as_deref()) {
        (VariableKind::Int, None) => expect(value.as_integer().is_some(), "an integer"),
        (VariableKind::Delay, None) => {
            expect(value.is_quantity_of(Dimension::Time), "a time quantity")
        }
        (VariableKind::Int | VariableKind::Delay, Some(_)) => unrecognized(),

        (VariableKind::Pulse, None) => Err(cannot_assign(format!(
            "a pulse takes the attributes {}",
            PULSE_ATTRIBUTES.join(", ")
        ))),
        (VariableKind::Pulse, Some("shape")) => {
            expect(value.as_str().is_some(), "a shape name or file path")
        }
        (VariableKind::Pulse, Some("length")) => {
            expect(value.is_quantity_of(Dimension::Time), "a time quantity")
        }
        (VariableKind::Pulse, Some("amplitude")) => {
            expect(value.is_quantity_of(Dimension::Voltage), "a voltage quantity")
        }
        (VariableKind::Pulse, Some(_)) => unrecognized(),

        (VariableKind::Output, _) => Err(cannot_assign("an output has no value".to_owned())),

        (VariableKind::AcqMarker, None) => Err(cannot_assign(
            "acquisitions take the attributes num, output".to_owned(),
        )),
        (VariableKind::AcqMarker, Some("num")) => expect(
            value.as_integer().is_some_and(|num| num >= 0),
            "a non-negative integer",
        ),
        (VariableKind::AcqMarker, Some("output")) => match value.as_str() {
            Some(output) if variables.get(output) == Some(&VariableKind::Output) => Ok(()),
            Some(output) => Err(cannot_assign(format!("{output} is not a declared output"))),
            None => expect(false, "the name of an output"),
        },
        (VariableKind::AcqMarker, Some(_)) => unrecognized(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::ast::{Value, ValuePath};
    use crate::environment::{AnalysisError, Environment, LookupError, Stage};
    use crate::units::Quantity;
    use crate::Program;

    const VALID: &str = "
        int repeat = 2
        delay abc1 = 100 ns, def2
        pulse ghi1, jkl2 = {shape: 'square'}
        output mno1, pqr2

        ghi1.shape = 'non-square.txt'
        ghi1.length = 8 ns
        ghi1.amplitude = 1 mV

        abc1
        (10 ns):pqr2
        times repeat {
            def2
            ghi1:mno1
        }
        acquire
    ";

    fn path(text: &str) -> ValuePath {
        text.parse().unwrap()
    }

    fn quantity(text: &str) -> Value {
        Value::Quantity(Quantity::from_str(text).unwrap())
    }

    fn analyzed(source: &str) -> Environment {
        let program = Program::from_str(source).unwrap();
        let mut env = Environment::default();
        env.run(Stage::Declarations, &program).unwrap();
        env.clear_errors();
        env.run(Stage::Values, &program).unwrap();
        env
    }

    #[test]
    fn binds_values() {
        let env = analyzed(VALID);
        let values: Vec<_> = env
            .values()
            .iter()
            .map(|(path, value)| (path.to_string(), value.clone()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("abc1".to_owned(), quantity("100 ns")),
                ("ghi1.amplitude".to_owned(), quantity("1 mV")),
                ("ghi1.length".to_owned(), quantity("8 ns")),
                ("ghi1.shape".to_owned(), Value::from("non-square.txt")),
                ("jkl2.shape".to_owned(), Value::from("square")),
                ("repeat".to_owned(), Value::Integer(2)),
            ]
        );

        let missing: BTreeSet<_> = [
            "_acq_marker.num",
            "_acq_marker.output",
            "def2",
            "jkl2.amplitude",
            "jkl2.length",
        ]
        .into_iter()
        .map(path)
        .collect();
        assert_eq!(env.missing_values(), &missing);
        assert_eq!(env.errors().len(), missing.len());
    }

    #[test]
    fn set_value_fills_missing_values() {
        let mut env = analyzed(VALID);
        env.clear_errors();
        let updates = [
            ("_acq_marker.num", Value::Integer(1)),
            ("_acq_marker.output", Value::from("mno1")),
            ("def2", quantity("7 ns")),
            ("jkl2.amplitude", quantity("1 V")),
            ("jkl2.length", quantity("50 ns")),
        ];
        for (target, value) in updates.clone() {
            env.set_value(path(target), value).unwrap();
        }
        assert!(env.errors().is_empty());
        assert!(env.missing_values().is_empty());
        for (target, value) in updates {
            assert_eq!(env.value(&path(target)), Some(&value));
        }

        env.set_value(path("def2"), quantity("9 ns")).unwrap();
        assert!(env.errors().is_empty());
        assert_eq!(env.value(&path("def2")), Some(&quantity("9 ns")));
    }

    #[test]
    fn set_value_resolves_must_assign() {
        let mut env = analyzed("output o\ndelay d, e\nd\n");
        let must_assign: Vec<_> = env
            .errors()
            .iter()
            .map(|diagnostic| diagnostic.to_string())
            .collect();
        assert_eq!(
            must_assign,
            vec!["Must assign a value to d (in `d`)", "Must assign a value to e (in `e`)"]
        );

        env.set_value(path("d"), quantity("7 ns")).unwrap();
        assert_eq!(env.errors().len(), 1);
        assert_eq!(
            env.errors()[0].error,
            AnalysisError::MustAssign { path: path("e") }
        );

        env.set_value(path("e"), quantity("5 V")).unwrap();
        assert_eq!(env.errors().len(), 2, "a rejected value leaves the path missing");
        assert!(env.missing_values().contains(&path("e")));
    }

    #[test]
    fn set_value_checks_types() {
        let mut env = analyzed(VALID);
        env.clear_errors();
        env.set_value(path("jkl2.length"), quantity("50 V")).unwrap();
        env.set_value(path("_acq_marker.output"), Value::from("abc1"))
            .unwrap();
        env.set_value(path("_acq_marker.num"), Value::Integer(-1))
            .unwrap();
        assert_eq!(env.errors().len(), 3);
        assert!(env.missing_values().contains(&path("jkl2.length")));
        assert!(env.value(&path("jkl2.length")).is_none());
    }

    #[rstest]
    #[case("xyz")]
    #[case("xyz.attribute")]
    fn set_value_rejects_undeclared(#[case] target: &str) {
        let mut env = analyzed(VALID);
        assert_eq!(
            env.set_value(path(target), Value::from("zyx")),
            Err(LookupError { path: path(target) })
        );
    }

    #[test]
    fn pulse_missing_attributes() {
        let mut env = analyzed("pulse p\n");
        let expected: BTreeSet<_> = ["p.amplitude", "p.length", "p.shape"]
            .into_iter()
            .map(path)
            .collect();
        assert_eq!(env.missing_values(), &expected);

        env.set_value(path("p.shape"), Value::from("square")).unwrap();
        env.set_value(path("p.length"), quantity("4 ns")).unwrap();
        env.set_value(path("p.amplitude"), quantity("1 V")).unwrap();
        assert!(env.missing_values().is_empty());
    }

    #[test]
    fn invalid_values() {
        let env = analyzed(
            r#"
            int repeat = 2
            delay abc1 = 100 ns, def2
            pulse ghi1, jkl2 = {shape: 'square'}
            output mno1, pqr2

            delay abc1 = 50 ms, def2
            mno1 = "test"
            def2 = 6 ; def2 = 6 Hz
            ghi1 = 0
            ghi1.shape = 50 ms
            jkl2.amplitude = 8
            jkl2.length = 1234 A
            repeat = 6 s
            repeat = 2.0
            zzz1 = 5 ms
            zzz1.foo = 5 ms
            ghi1.something_else = 5

            times 5 {
                int x = 9
                y = 10
            }
            "#,
        );

        let prefixes: Vec<_> = env
            .errors()
            .iter()
            .map(|diagnostic| {
                let message = diagnostic.error.to_string();
                message[..message.find(|chr: char| chr == ' ' || chr == ':').unwrap_or(0)]
                    .to_owned()
            })
            .collect();
        let expected: Vec<_> = std::iter::once("Re-assignment")
            .chain(["Cannot"; 9])
            .chain(["Undeclared"; 2])
            .chain(["Unrecognized", "Assignment"])
            .chain(["Must"; 6])
            .collect();
        assert_eq!(prefixes, expected);

        assert_eq!(env.value(&path("abc1")), Some(&quantity("50 ms")));
        assert_eq!(env.value(&path("repeat")), Some(&Value::Integer(2)));
        assert_eq!(
            env.errors()[1].error,
            AnalysisError::CannotAssign {
                path: path("mno1"),
                reason: "an output has no value".to_owned(),
            }
        );
        assert_eq!(
            env.errors().last().map(|diagnostic| &diagnostic.error),
            Some(&AnalysisError::MustAssign {
                path: path("jkl2.length")
            })
        );
    }

    #[test]
    fn acquisition_values_only_required_with_acquire() {
        let env = analyzed("output o\n");
        assert!(env.missing_values().is_empty());
        assert!(env.errors().is_empty());
    }
}
