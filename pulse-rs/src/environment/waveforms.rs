use log::{debug, warn};

use crate::program::Program;
use crate::waveform::assembler::Assembler;

use super::{CompileError, Environment};

impl Environment {
    /// Render every output. Unlike the other stages, any problem here is fatal.
    pub(super) fn render_waveforms(&mut self, program: &Program) -> Result<(), CompileError> {
        self.waveforms.clear();
        if !self.errors.is_empty() {
            warn!(
                "rendering waveforms with {} outstanding diagnostics",
                self.errors.len()
            );
        }

        let waveforms = Assembler::new(&self.settings, &self.variables, &self.values)?
            .assemble(program.body())?;
        for (output, waveform) in &waveforms {
            debug!("rendered {} samples for output {output}", waveform.len());
        }
        self.waveforms = waveforms;
        Ok(())
    }
}
