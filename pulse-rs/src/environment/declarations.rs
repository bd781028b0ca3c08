use crate::ast::{Command, Node, VariableKind};
use crate::program::Program;

use super::{AnalysisError, Environment, ACQ_MARKER};

impl Environment {
    /// Build the table of declared names. The first declaration of a name wins.
    pub(super) fn declare(&mut self, program: &Program) {
        self.variables.clear();
        self.variables
            .insert(ACQ_MARKER.to_owned(), VariableKind::AcqMarker);
        self.declare_nodes(program.body(), false);
    }

    fn declare_nodes(&mut self, nodes: &[Node], in_loop: bool) {
        for node in nodes {
            match node {
                Node::Declaration(declaration) => {
                    for declared in &declaration.names {
                        let name = declared.name.clone();
                        if in_loop {
                            self.record(AnalysisError::DeclarationInLoop { name }, declaration);
                        } else if self.variables.contains_key(&name) {
                            self.record(AnalysisError::Redeclaration { name }, declaration);
                        } else {
                            self.variables.insert(name, declaration.kind);
                        }
                    }
                }
                Node::Command(Command::Repeat(repeat)) => self.declare_nodes(&repeat.body, true),
                Node::Assignment(_) | Node::Command(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use crate::ast::VariableKind;
    use crate::environment::{AnalysisError, Environment, Stage, ACQ_MARKER};
    use crate::Program;

    #[test]
    fn declared_names() {
        let program = Program::from_str(
            "int repeat = 2
            delay abc1 = 100 ns, def2
            pulse ghi1, jkl2 = {shape: 'square'}
            output mno1, pqr2
            abc1",
        )
        .unwrap();
        let mut env = Environment::default();
        env.run(Stage::Declarations, &program).unwrap();

        let variables: Vec<_> = env
            .variables()
            .iter()
            .map(|(name, kind)| (name.as_str(), *kind))
            .collect();
        assert_eq!(
            variables,
            vec![
                (ACQ_MARKER, VariableKind::AcqMarker),
                ("repeat", VariableKind::Int),
                ("abc1", VariableKind::Delay),
                ("def2", VariableKind::Delay),
                ("ghi1", VariableKind::Pulse),
                ("jkl2", VariableKind::Pulse),
                ("mno1", VariableKind::Output),
                ("pqr2", VariableKind::Output),
            ]
        );
        assert!(env.errors().is_empty());

        let first = env.variables().clone();
        env.run(Stage::Declarations, &program).unwrap();
        assert_eq!(env.variables(), &first);
    }

    #[test]
    fn invalid_declarations() {
        let program = Program::from_str(
            "int repeat = 2
            delay abc1 = 100 ns, def2
            pulse ghi1, jkl2 = {shape: 'square'}
            output mno1, pqr2

            delay abc1, def2 = 10 ms, stu3
            pulse repeat

            vwx4

            times 5 {
                int x = 9
            }",
        )
        .unwrap();
        let mut env = Environment::default();
        env.run(Stage::Declarations, &program).unwrap();

        let errors: Vec<_> = env.errors().iter().map(|d| d.error.clone()).collect();
        assert_eq!(
            errors,
            vec![
                AnalysisError::Redeclaration {
                    name: "abc1".to_owned()
                },
                AnalysisError::Redeclaration {
                    name: "def2".to_owned()
                },
                AnalysisError::Redeclaration {
                    name: "repeat".to_owned()
                },
                AnalysisError::DeclarationInLoop {
                    name: "x".to_owned()
                },
            ]
        );
        assert_eq!(env.variables()["repeat"], VariableKind::Int);
        assert_eq!(env.variables()["stu3"], VariableKind::Delay);
        assert!(!env.variables().contains_key("x"));
    }
}
