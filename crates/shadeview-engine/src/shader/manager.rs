use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Result;

use super::{validate_pair, ShaderRole, ShaderSource};

/// Turns validated stage sources into a runnable program.
///
/// The GPU implementation is [`super::PipelineCompiler`]; the seam keeps the
/// reload bookkeeping independent of any device.
pub trait ProgramCompiler {
    type Program;

    /// Builds a program from sources that already passed [`validate_pair`].
    fn compile(&self, vertex: &str, fragment: &str) -> Result<Self::Program>;
}

/// Owns the tracked shader files and the single active program.
///
/// Invariant: `program` and the recorded timestamps only change together, on a
/// fully successful load. A failed load leaves both untouched.
pub struct ShaderManager<P> {
    /// Vertex first, fragment second; also the change-check order.
    sources: [ShaderSource; 2],
    program: Option<P>,

    /// Number of successful loads so far.
    generation: u64,
}

impl<P> ShaderManager<P> {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            sources: [
                ShaderSource::new(ShaderRole::Vertex, vertex),
                ShaderSource::new(ShaderRole::Fragment, fragment),
            ],
            program: None,
            generation: 0,
        }
    }

    pub fn sources(&self) -> &[ShaderSource] {
        &self.sources
    }

    pub fn source(&self, role: ShaderRole) -> &ShaderSource {
        match role {
            ShaderRole::Vertex => &self.sources[0],
            ShaderRole::Fragment => &self.sources[1],
        }
    }

    /// The active program, or `None` if no load has succeeded yet.
    pub fn program(&self) -> Option<&P> {
        self.program.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reads, validates and compiles both stages, then swaps in the new program.
    ///
    /// Errors are logged, not returned: the previous program (if any) keeps
    /// running. Returns `true` when a new program was installed.
    pub fn load_shaders<C>(&mut self, compiler: &C) -> bool
    where
        C: ProgramCompiler<Program = P>,
    {
        match self.try_load(compiler) {
            Ok((program, stamps)) => {
                self.program = Some(program);
                for (source, modified) in self.sources.iter_mut().zip(stamps) {
                    source.stamp(modified);
                }
                self.generation += 1;
                log::info!("shaders loaded successfully");
                true
            }
            Err(e) => {
                log::error!("error loading shaders: {e:#}");
                false
            }
        }
    }

    /// Reloads once if any tracked file's modification time changed.
    ///
    /// Files are checked in order and the first change triggers a single
    /// reload of both stages; remaining files are not checked. A file that
    /// cannot be stat'ed is logged and skipped. Returns `true` when a reload
    /// was attempted, whether or not it succeeded.
    pub fn check_for_changes<C>(&mut self, compiler: &C) -> bool
    where
        C: ProgramCompiler<Program = P>,
    {
        let changed = self.sources.iter().find(|source| match source.is_stale() {
            Ok(stale) => stale,
            Err(e) => {
                log::error!("error checking {}: {e:#}", source.path().display());
                false
            }
        });

        let Some(source) = changed else {
            return false;
        };

        log::info!(
            "detected changes in {}, reloading shaders",
            source.path().display()
        );
        self.load_shaders(compiler);
        true
    }

    fn try_load<C>(&self, compiler: &C) -> Result<(P, [SystemTime; 2])>
    where
        C: ProgramCompiler<Program = P>,
    {
        let [vs, fs] = &self.sources;

        let vertex = vs.read()?;
        let fragment = fs.read()?;
        validate_pair(&vertex, &fragment)?;

        let program = compiler.compile(&vertex, &fragment)?;
        let stamps = [vs.modified_time()?, fs.modified_time()?];

        Ok((program, stamps))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::shader::fixtures;
    use crate::testing::{epoch, modified, set_modified, ScratchDir};

    /// Counts compilations; the program is the compile ordinal.
    #[derive(Default)]
    struct CountingCompiler {
        compiles: Cell<u32>,
    }

    impl ProgramCompiler for CountingCompiler {
        type Program = u32;

        fn compile(&self, _vertex: &str, _fragment: &str) -> Result<u32> {
            let n = self.compiles.get() + 1;
            self.compiles.set(n);
            Ok(n)
        }
    }

    struct RejectingCompiler;

    impl ProgramCompiler for RejectingCompiler {
        type Program = u32;

        fn compile(&self, _vertex: &str, _fragment: &str) -> Result<u32> {
            anyhow::bail!("pipeline creation failed")
        }
    }

    fn setup(name: &str) -> (ScratchDir, ShaderManager<u32>) {
        let dir = ScratchDir::new(name);
        let vs = dir.write("shader.vert", fixtures::PASSTHROUGH_VERT, epoch(0));
        let fs = dir.write("shader.frag", fixtures::PASSTHROUGH_FRAG, epoch(0));
        (dir, ShaderManager::new(vs, fs))
    }

    fn stamps(m: &ShaderManager<u32>) -> Vec<Option<SystemTime>> {
        m.sources().iter().map(|s| s.last_modified()).collect()
    }

    #[test]
    fn load_records_filesystem_timestamps() {
        let (dir, mut m) = setup("load_stamps");
        set_modified(&dir.path().join("shader.frag"), epoch(5));

        assert!(m.load_shaders(&CountingCompiler::default()));
        assert_eq!(m.program(), Some(&1));
        assert_eq!(m.generation(), 1);
        assert_eq!(
            m.source(ShaderRole::Vertex).last_modified(),
            Some(modified(&dir.path().join("shader.vert")))
        );
        assert_eq!(
            m.source(ShaderRole::Fragment).last_modified(),
            Some(modified(&dir.path().join("shader.frag")))
        );
    }

    #[test]
    fn syntax_error_on_first_load_leaves_no_program() {
        let dir = ScratchDir::new("first_load_broken");
        let vs = dir.write("shader.vert", fixtures::PASSTHROUGH_VERT, epoch(0));
        let fs = dir.write("shader.frag", fixtures::BROKEN_FRAG, epoch(0));
        let mut m: ShaderManager<u32> = ShaderManager::new(vs, fs);

        let compiler = CountingCompiler::default();
        assert!(!m.load_shaders(&compiler));
        assert!(m.program().is_none());
        assert_eq!(compiler.compiles.get(), 0);
        assert_eq!(stamps(&m), vec![None, None]);
    }

    #[test]
    fn failed_reload_keeps_previous_program_and_stamps() {
        let (dir, mut m) = setup("failed_reload");
        let compiler = CountingCompiler::default();
        assert!(m.load_shaders(&compiler));
        let before = stamps(&m);

        dir.write("shader.frag", fixtures::BROKEN_FRAG, epoch(10));
        assert!(!m.load_shaders(&compiler));

        assert_eq!(m.program(), Some(&1));
        assert_eq!(m.generation(), 1);
        assert_eq!(stamps(&m), before);
    }

    #[test]
    fn compiler_failure_keeps_previous_program() {
        let (_dir, mut m) = setup("compiler_failure");
        assert!(m.load_shaders(&CountingCompiler::default()));
        let before = stamps(&m);

        assert!(!m.load_shaders(&RejectingCompiler));
        assert_eq!(m.program(), Some(&1));
        assert_eq!(stamps(&m), before);
    }

    #[test]
    fn missing_file_fails_load() {
        let dir = ScratchDir::new("missing_file");
        let vs = dir.write("shader.vert", fixtures::PASSTHROUGH_VERT, epoch(0));
        let mut m: ShaderManager<u32> = ShaderManager::new(vs, dir.path().join("absent.frag"));
        assert!(!m.load_shaders(&CountingCompiler::default()));
        assert!(m.program().is_none());
    }

    #[test]
    fn repeated_checks_without_edits_do_not_reload() {
        let (_dir, mut m) = setup("no_edits");
        let compiler = CountingCompiler::default();
        m.load_shaders(&compiler);

        assert!(!m.check_for_changes(&compiler));
        assert!(!m.check_for_changes(&compiler));
        assert_eq!(compiler.compiles.get(), 1);
    }

    #[test]
    fn change_in_one_file_reloads_once_and_restamps_both() {
        let (dir, mut m) = setup("one_change");
        let compiler = CountingCompiler::default();
        m.load_shaders(&compiler);

        let frag = dir.path().join("shader.frag");
        let vert = dir.path().join("shader.vert");
        set_modified(&frag, epoch(20));

        assert!(m.check_for_changes(&compiler));
        assert_eq!(compiler.compiles.get(), 2);
        assert_eq!(m.program(), Some(&2));
        assert_eq!(m.source(ShaderRole::Fragment).last_modified(), Some(modified(&frag)));
        assert_eq!(m.source(ShaderRole::Vertex).last_modified(), Some(modified(&vert)));

        assert!(!m.check_for_changes(&compiler));
    }

    #[test]
    fn both_files_changed_still_reload_once() {
        let (dir, mut m) = setup("two_changes");
        let compiler = CountingCompiler::default();
        m.load_shaders(&compiler);

        set_modified(&dir.path().join("shader.vert"), epoch(30));
        set_modified(&dir.path().join("shader.frag"), epoch(31));

        assert!(m.check_for_changes(&compiler));
        assert_eq!(compiler.compiles.get(), 2);
        assert!(!m.check_for_changes(&compiler));
    }

    #[test]
    fn unreadable_file_is_skipped_during_check() {
        let (dir, mut m) = setup("unreadable");
        let compiler = CountingCompiler::default();
        m.load_shaders(&compiler);

        std::fs::remove_file(dir.path().join("shader.vert")).unwrap();

        assert!(!m.check_for_changes(&compiler));
        assert_eq!(compiler.compiles.get(), 1);
        assert_eq!(m.program(), Some(&1));
    }

    #[test]
    fn failed_reload_is_retried_on_next_check() {
        let (dir, mut m) = setup("retry");
        let compiler = CountingCompiler::default();
        m.load_shaders(&compiler);

        dir.write("shader.frag", fixtures::BROKEN_FRAG, epoch(40));
        assert!(m.check_for_changes(&compiler));
        assert_eq!(m.program(), Some(&1));

        dir.write("shader.frag", fixtures::PASSTHROUGH_FRAG, epoch(41));
        assert!(m.check_for_changes(&compiler));
        assert_eq!(m.program(), Some(&2));
    }
}
