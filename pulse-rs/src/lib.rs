// Copyright 2021 Rigetti Computing
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! A compiler for pulse sequences: text programs describing delays, shaped pulses, loops and
//! acquisitions, rendered into sampled waveforms for an arbitrary-waveform generator.
//!
//! Within this crate you'll find:
//!
//! * A [parser] and [serializer] for pulse sequence [programs]
//! * Physical [quantities] with SI prefixes and dimension checks
//! * A staged [environment] which reports every problem in a program at once
//! * A [waveform] renderer producing one wave and two marker channels per output
//!
//! A complete compilation reads:
//!
//! ```
//! use std::str::FromStr;
//!
//! use pulse_rs::{Environment, Program};
//!
//! let program = Program::from_str("output o\ndelay d = 4 ns\nd\n").unwrap();
//! let mut env = Environment::default();
//! env.run_all(&program).unwrap();
//! assert!(env.errors().is_empty());
//! assert_eq!(env.waveforms()["o"].wave(), &[0.0; 4]);
//! ```
//!
//! [environment]: crate::environment::Environment
//! [parser]: crate::program::Program#method.from_str
//! [programs]: crate::program::Program
//! [quantities]: crate::units::Quantity
//! [serializer]: crate::program::Program#method.to_string
//! [waveform]: crate::waveform::Waveform

pub mod ast;
pub mod environment;
pub(crate) mod parser;
pub mod program;
pub mod settings;
pub mod units;
pub mod waveform;

pub use environment::Environment;
pub use program::Program;
pub use settings::Settings;
