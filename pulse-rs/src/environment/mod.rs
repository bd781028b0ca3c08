//! Multi-pass analysis of a [`Program`].
//!
//! An [`Environment`] is carried through four traversals of the same program, in a fixed order:
//!
//! 1. [`Stage::Declarations`] builds the table of declared names.
//! 2. [`Stage::Values`] binds and checks literal values, and records which required values are
//!    still missing.
//! 3. [`Stage::Commands`] checks the timeline.
//! 4. [`Stage::Waveforms`] renders one [`Waveform`] per declared output.
//!
//! The first three stages never fail: problems are collected in [`Environment::errors`] so that
//! all of them can be reported at once. Rendering cannot proceed without concrete values, so the
//! last stage fails with a [`CompileError`] instead.
//!
//! Between stages, values can be supplied or corrected with [`Environment::set_value`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use log::debug;
use strum::IntoEnumIterator;

use crate::ast::{Value, ValuePath, VariableKind};
use crate::program::Program;
use crate::settings::Settings;
use crate::units::Quantity;
use crate::waveform::{Waveform, WaveformError};

mod commands;
mod declarations;
mod values;
mod waveforms;

use values::WriteMode;

/// The pseudo-variable holding the `num` and `output` of acquisitions.
pub const ACQ_MARKER: &str = "_acq_marker";

/// One traversal of a program.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Declarations,
    Values,
    Commands,
    Waveforms,
}

/// A problem found by one of the analysis stages.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Re-declaration of {name}")]
    Redeclaration { name: String },

    #[error("Declaration of {name} is not allowed inside a loop")]
    DeclarationInLoop { name: String },

    #[error("Undeclared name: {name}")]
    Undeclared { name: String },

    #[error("Cannot assign to {path}: {reason}")]
    CannotAssign { path: ValuePath, reason: String },

    #[error("Unrecognized attribute: {path}")]
    UnrecognizedAttribute { path: ValuePath },

    #[error("Re-assignment of {path}")]
    Reassignment { path: ValuePath },

    #[error("Assignment to {path} is not allowed inside a loop")]
    AssignmentInLoop { path: ValuePath },

    #[error("Must assign a value to {path}")]
    MustAssign { path: ValuePath },

    #[error("Not a declared delay or pulse: {name}")]
    NotADelayOrPulse { name: String },

    #[error("Not a declared output: {name}")]
    NotAnOutput { name: String },

    #[error("Repeated variable must be an int: {name}")]
    RepeatNotInt { name: String },

    #[error("Repetition count must be non-negative: {count}")]
    NegativeRepeat { count: i64 },

    #[error("Delay must be a time quantity: {quantity}")]
    NotATime { quantity: Quantity },

    #[error("Delay multiply-used: output {name} would need more than one simultaneous duration")]
    DelayMultiplyUsed { name: String },
}

/// An [`AnalysisError`] and the source text of the node where it was found.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{error} (in `{node}`)")]
pub struct Diagnostic {
    pub error: AnalysisError,
    pub node: String,
}

/// A stage could not run to completion.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot run the {stage} stage before the {missing} stage has completed")]
    StageOrder { stage: Stage, missing: Stage },

    #[error("failed to render waveforms: {0}")]
    Waveform(#[from] WaveformError),
}

/// A value was given for a name which was never declared.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no declared variable for {path}")]
pub struct LookupError {
    pub path: ValuePath,
}

/// The state of one compilation.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    settings: Settings,
    stage: Option<Stage>,
    completed: BTreeSet<Stage>,
    variables: IndexMap<String, VariableKind>,
    values: BTreeMap<ValuePath, Value>,
    missing_values: BTreeSet<ValuePath>,
    errors: Vec<Diagnostic>,
    acquisitions: usize,
    waveforms: IndexMap<String, Waveform>,
}

impl Environment {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The stage which ran last, if any.
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Whether `stage` has run to completion at least once.
    pub fn has_completed(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// Run one stage over `program`.
    ///
    /// Every earlier stage must have completed at least once. Running a stage again resets what
    /// that stage produces, but not [`Environment::errors`].
    pub fn run(&mut self, stage: Stage, program: &Program) -> Result<(), CompileError> {
        if let Some(missing) = Stage::iter()
            .take_while(|earlier| *earlier < stage)
            .find(|earlier| !self.completed.contains(earlier))
        {
            return Err(CompileError::StageOrder { stage, missing });
        }

        debug!(
            "running {stage} stage over {} top-level nodes",
            program.body().len()
        );
        let recorded = self.errors.len();
        self.stage = Some(stage);
        match stage {
            Stage::Declarations => self.declare(program),
            Stage::Values => self.bind_values(program),
            Stage::Commands => self.check_commands(program),
            Stage::Waveforms => self.render_waveforms(program)?,
        }
        self.completed.insert(stage);
        debug!(
            "finished {stage} stage with {} new diagnostics",
            self.errors.len() - recorded
        );
        Ok(())
    }

    /// Run every stage in order.
    pub fn run_all(&mut self, program: &Program) -> Result<(), CompileError> {
        Stage::iter().try_for_each(|stage| self.run(stage, program))
    }

    /// Bind a value after the fact, as if it had been assigned in the program.
    ///
    /// Fails if the name was never declared. A value of the wrong type is recorded in
    /// [`Environment::errors`] and not bound.
    pub fn set_value(&mut self, path: ValuePath, value: Value) -> Result<(), LookupError> {
        let node = format!("{path} = {value}");
        self.write_value(path, value, WriteMode::Raise, &node)
    }

    /// Declared names and their kinds, in declaration order.
    pub fn variables(&self) -> &IndexMap<String, VariableKind> {
        &self.variables
    }

    pub fn values(&self) -> &BTreeMap<ValuePath, Value> {
        &self.values
    }

    pub fn value(&self, path: &ValuePath) -> Option<&Value> {
        self.values.get(path)
    }

    /// Values which must be bound before waveforms can be rendered.
    pub fn missing_values(&self) -> &BTreeSet<ValuePath> {
        &self.missing_values
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// The number of `acquire` commands found by the commands stage.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions
    }

    pub fn has_acquisition(&self) -> bool {
        self.acquisitions > 0
    }

    /// Rendered waveforms by output name, in output declaration order.
    pub fn waveforms(&self) -> &IndexMap<String, Waveform> {
        &self.waveforms
    }

    pub fn into_waveforms(self) -> IndexMap<String, Waveform> {
        self.waveforms
    }

    fn record(&mut self, error: AnalysisError, node: &dyn fmt::Display) {
        self.errors.push(Diagnostic {
            error,
            node: node.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Stage::Values, Stage::Declarations)]
    #[case(Stage::Commands, Stage::Declarations)]
    #[case(Stage::Waveforms, Stage::Declarations)]
    fn stages_run_in_order(#[case] stage: Stage, #[case] missing: Stage) {
        let program = Program::from_str("delay d = 1 ns\n").unwrap();
        let mut env = Environment::default();
        match env.run(stage, &program) {
            Err(CompileError::StageOrder {
                stage: refused,
                missing: first_missing,
            }) => assert_eq!((refused, first_missing), (stage, missing)),
            other => panic!("expected a stage order error, got {other:?}"),
        }
        assert_eq!(env.stage(), None);
    }

    #[test]
    fn skipped_stage_is_reported() {
        let program = Program::from_str("delay d = 1 ns\n").unwrap();
        let mut env = Environment::default();
        env.run(Stage::Declarations, &program).unwrap();
        env.run(Stage::Values, &program).unwrap();
        assert!(matches!(
            env.run(Stage::Waveforms, &program),
            Err(CompileError::StageOrder {
                stage: Stage::Waveforms,
                missing: Stage::Commands,
            })
        ));
    }

    #[test]
    fn earlier_stages_can_rerun() {
        let program = Program::from_str("output o\ndelay d = 2 ns\nd\n").unwrap();
        let mut env = Environment::default();
        env.run_all(&program).unwrap();
        assert_eq!(env.stage(), Some(Stage::Waveforms));

        env.run(Stage::Values, &program).unwrap();
        env.run(Stage::Waveforms, &program).unwrap();
        assert_eq!(env.waveforms()["o"].len(), 2);
        assert!(Stage::iter().all(|stage| env.has_completed(stage)));
    }

    #[test]
    fn diagnostics_display_their_node() {
        let program = Program::from_str("int n = 1\nint n\n").unwrap();
        let mut env = Environment::default();
        env.run(Stage::Declarations, &program).unwrap();
        assert_eq!(env.errors().len(), 1);
        assert_eq!(env.errors()[0].to_string(), "Re-declaration of n (in `int n`)");
        env.clear_errors();
        assert!(env.errors().is_empty());
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Declarations.to_string(), "declarations");
        assert_eq!(Stage::from_str("waveforms").unwrap(), Stage::Waveforms);
    }
}
