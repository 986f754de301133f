use crate::algorithms::search;
use crate::config::GridSettings;
use crate::error::VisualizerError;
use crate::grid::{Grid, Position};
use crate::playback::{PlaybackEvent, PlaybackHandle, Scheduler, Speed};
use crate::statistics::RunSummary;
use log::{debug, info};
use rand::Rng;
use rustc_hash::FxHashMap;
use std::time::Instant;

type Result<T> = std::result::Result<T, VisualizerError>;

/// How a cell has been painted by the current playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Visited,
    Path,
}

/// One visualizer session: the board being edited, the playback drawing on
/// it, and the metrics of the last finished run.
///
/// Only one playback runs at a time. Edits and new runs are refused until the
/// running one reports `Finished`; `reset` cancels it instead. Events are
/// only painted when they come from the active playback.
pub struct Visualizer {
    settings: GridSettings,
    grid: Grid,
    scheduler: Scheduler,
    active_epoch: Option<u64>,
    pending_summary: Option<RunSummary>,
    summary: Option<RunSummary>,
    marks: FxHashMap<Position, Mark>,
}

impl Visualizer {
    pub fn new(settings: GridSettings) -> Result<Self> {
        let grid = settings.build()?;
        Ok(Visualizer {
            settings,
            grid,
            scheduler: Scheduler::new(),
            active_epoch: None,
            pending_summary: None,
            summary: None,
            marks: FxHashMap::default(),
        })
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// A playback is running until its `Finished` is applied or something
    /// supersedes it.
    pub fn is_running(&self) -> bool {
        self.active_epoch
            .is_some_and(|epoch| epoch == self.scheduler.current_epoch())
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn mark(&self, pos: Position) -> Option<Mark> {
        self.marks.get(&pos).copied()
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_running() {
            return Err(VisualizerError::Busy);
        }
        Ok(())
    }

    pub fn toggle(&mut self, row: usize, col: usize) -> Result<()> {
        self.ensure_idle()?;
        self.grid = self.grid.toggle_obstacle(row, col);
        Ok(())
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) -> Result<()> {
        self.ensure_idle()?;
        self.grid = self.grid.randomized(density, rng);
        self.marks.clear();
        info!(
            "randomized board: {} walls at density {:.2}",
            self.grid.obstacle_count(),
            density
        );
        Ok(())
    }

    /// Cancels any running playback and starts over on an empty board.
    pub fn reset(&mut self) {
        if self.is_running() {
            let epoch = self.scheduler.cancel_all();
            debug!("reset cancelled playback, epoch now {}", epoch);
        }
        self.grid = self.grid.reset();
        self.active_epoch = None;
        self.pending_summary = None;
        self.summary = None;
        self.marks.clear();
    }

    /// Searches the current board and starts replaying the result.
    pub fn run(&mut self, speed: Speed) -> Result<PlaybackHandle> {
        self.ensure_idle()?;

        let snapshot = self.grid.clone();
        let started = Instant::now();
        let result = search(&snapshot, snapshot.source(), snapshot.target())?;
        let summary = RunSummary::new(&result, started.elapsed());

        info!(
            "search finished in {:.2}ms: {} explored, path {:?}",
            summary.search_millis(),
            summary.visited_count,
            summary.path_length
        );

        self.marks.clear();
        self.summary = None;
        self.pending_summary = Some(summary);
        let handle = self
            .scheduler
            .play(&result.visited_order, &result.path_order, speed);
        self.active_epoch = Some(handle.epoch());
        Ok(handle)
    }

    /// Paints one event of the playback started at `epoch`. Events of any
    /// other playback are dropped. Returns whether the event was applied.
    pub fn apply(&mut self, epoch: u64, event: PlaybackEvent) -> bool {
        if self.active_epoch != Some(epoch) || !self.is_running() {
            debug!("dropping {:?} from stale playback {}", event, epoch);
            return false;
        }
        match event {
            PlaybackEvent::Visited(pos) => {
                self.marks.insert(pos, Mark::Visited);
            }
            PlaybackEvent::OnPath(pos) => {
                self.marks.insert(pos, Mark::Path);
            }
            PlaybackEvent::Finished => {
                self.active_epoch = None;
                self.summary = self.pending_summary.take();
            }
        }
        true
    }

    /// Takes every event the playback has emitted so far. Returns how many
    /// were applied; a stale handle is emptied without painting anything.
    pub fn drain(&mut self, handle: &PlaybackHandle) -> usize {
        let mut applied = 0;
        while let Some(event) = handle.try_next() {
            if self.apply(handle.epoch(), event) {
                applied += 1;
            }
        }
        applied
    }

    /// The board with the playback's marks painted over it.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.grid.cols() + 1) * self.grid.rows());
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let pos = Position::new(row, col);
                let c = if pos == self.grid.source() {
                    'S'
                } else if pos == self.grid.target() {
                    'T'
                } else if self.grid.is_obstacle(pos) {
                    '#'
                } else {
                    match self.marks.get(&pos) {
                        Some(Mark::Path) => '*',
                        Some(Mark::Visited) => 'o',
                        None => '.',
                    }
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings() -> GridSettings {
        GridSettings {
            rows: 5,
            cols: 5,
            source: Position::new(0, 0),
            target: Position::new(0, 4),
        }
    }

    #[test]
    fn rejects_bad_settings() {
        let mut bad = settings();
        bad.target = bad.source;
        assert!(matches!(
            Visualizer::new(bad),
            Err(VisualizerError::Grid(_))
        ));
    }

    #[test]
    fn run_paints_and_publishes_summary() {
        let mut viz = Visualizer::new(settings()).unwrap();
        viz.toggle(0, 2).unwrap();
        viz.toggle(1, 2).unwrap();

        let mut handle = viz.run(Speed::Fast).unwrap();
        assert!(viz.is_running());
        assert!(viz.summary().is_none());

        assert!(handle.wait());
        viz.drain(&handle);

        assert!(!viz.is_running());
        let summary = viz.summary().unwrap();
        assert_eq!(summary.path_length, Some(8));
        assert_eq!(viz.mark(Position::new(2, 2)), Some(Mark::Path));
        let frame = viz.render();
        assert!(frame.starts_with('S'));
        assert_eq!(frame.matches('*').count(), 7);
    }

    #[test]
    fn edits_are_refused_while_running() {
        let mut viz = Visualizer::new(settings()).unwrap();
        let _handle = viz.run(Speed::Slow).unwrap();
        assert_eq!(viz.toggle(3, 3), Err(VisualizerError::Busy));
        assert!(matches!(viz.run(Speed::Fast), Err(VisualizerError::Busy)));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(viz.randomize(0.3, &mut rng), Err(VisualizerError::Busy));
    }

    #[test]
    fn reset_cancels_running_playback() {
        let mut viz = Visualizer::new(settings()).unwrap();
        viz.toggle(2, 2).unwrap();
        let mut handle = viz.run(Speed::Slow).unwrap();

        viz.reset();
        assert!(!viz.is_running());
        assert!(!handle.wait());
        assert!(handle.is_cancelled());
        assert_eq!(viz.grid().obstacle_count(), 0);
        assert!(viz.summary().is_none());
    }

    #[test]
    fn stale_handle_cannot_touch_the_next_run() {
        let mut viz = Visualizer::new(settings()).unwrap();
        let mut old = viz.run(Speed::Fast).unwrap();
        assert!(old.wait());

        viz.reset();
        viz.toggle(4, 4).unwrap();
        let _current = viz.run(Speed::Slow).unwrap();

        assert_eq!(viz.drain(&old), 0);
        assert!(old.try_next().is_none());
        assert!(viz.is_running());
        assert!(viz.summary().is_none());
        assert_eq!(viz.mark(Position::new(0, 1)), None);
        assert!(matches!(viz.run(Speed::Fast), Err(VisualizerError::Busy)));
        assert!(!viz.apply(old.epoch(), PlaybackEvent::Finished));
        assert!(viz.is_running());
    }

    #[test]
    fn cancelling_through_the_handle_frees_the_session() {
        let mut viz = Visualizer::new(settings()).unwrap();
        let mut handle = viz.run(Speed::Slow).unwrap();
        handle.cancel();
        assert!(!handle.wait());
        assert!(!viz.is_running());
        assert!(viz.toggle(3, 3).is_ok());
    }

    #[test]
    fn unreachable_run_reports_no_path() {
        let mut viz = Visualizer::new(settings()).unwrap();
        for row in 0..5 {
            viz.toggle(row, 2).unwrap();
        }
        let mut handle = viz.run(Speed::Fast).unwrap();
        assert!(handle.wait());
        viz.drain(&handle);

        let summary = viz.summary().unwrap();
        assert_eq!(summary.path_length, None);
        assert_eq!(summary.visited_count, 10);
        assert!(!viz.render().contains('*'));
    }

    #[test]
    fn toggling_endpoints_is_ignored() {
        let mut viz = Visualizer::new(settings()).unwrap();
        viz.toggle(0, 0).unwrap();
        viz.toggle(0, 4).unwrap();
        assert_eq!(viz.grid().obstacle_count(), 0);
    }
}
