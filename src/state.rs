use crate::pipeline::Pipeline;
use crate::viz::Figure;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The figure currently on screen and how far the run has progressed,
/// independent of rendering.
pub struct ViewerState {
    /// Figure awaiting acknowledgement (None once the run is finished).
    pub figure: Option<Figure>,

    /// 1-based number of the figure on screen.
    pub step: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set once the last figure has been acknowledged.
    pub finished: bool,

    /// GPU texture for the missing-pattern image, uploaded on first draw.
    #[cfg(feature = "missing-matrix")]
    pub missing_texture: Option<eframe::egui::TextureHandle>,
}

impl ViewerState {
    /// Wrap the first figure of a run.
    pub fn new(first: Figure) -> Self {
        Self {
            figure: Some(first),
            step: 1,
            status_message: None,
            finished: false,
            #[cfg(feature = "missing-matrix")]
            missing_texture: None,
        }
    }

    /// Dismiss the current figure and pull the next one from the pipeline.
    ///
    /// Returns `true` while there is still something to show.
    pub fn acknowledge(&mut self, pipeline: &mut Pipeline) -> bool {
        if self.finished {
            return false;
        }
        if let Some(done) = &self.figure {
            log::debug!("figure {} acknowledged: {}", self.step, done.title());
        }
        #[cfg(feature = "missing-matrix")]
        {
            self.missing_texture = None;
        }

        let failed_before = pipeline.failures().len();
        self.figure = pipeline.next_figure();
        // Only report steps that failed while reaching this figure.
        self.status_message = pipeline.failures()[failed_before..]
            .last()
            .map(|(stage, msg)| format!("[{stage}] {msg}"));

        match self.figure {
            Some(_) => {
                self.step += 1;
                true
            }
            None => {
                self.finished = true;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayMode, EdaConfig};
    use crate::data::loader::parse_str;

    #[test]
    fn acknowledging_walks_every_figure_once() {
        let table = parse_str("a,b\n1,2\n2,4\n3,7\n").unwrap();
        let cfg = EdaConfig {
            display: DisplayMode::Headless,
            group_test: None,
            missing_pattern: false,
            ..EdaConfig::default()
        };
        let mut pipeline = Pipeline::from_table(cfg, table);
        let first = pipeline.next_figure().unwrap();
        let mut state = ViewerState::new(first);

        // a, b distributions then the heatmap.
        assert!(state.acknowledge(&mut pipeline));
        assert_eq!(state.step, 2);
        assert!(state.acknowledge(&mut pipeline));
        assert_eq!(state.figure.as_ref().unwrap().title(), "Correlation Heatmap");
        assert!(!state.acknowledge(&mut pipeline));
        assert!(state.finished);
        assert!(state.figure.is_none());
        assert!(!state.acknowledge(&mut pipeline));
        assert_eq!(state.step, 3);
    }
}
