//! Editing session: the two finalized stills, the blend parameters, and
//! the most recently published composite.
//!
//! The session is a plain owned value. The UI keeps one in a signal and
//! calls into it on every user action; any action that should refresh
//! the preview returns a [`CompositeRequest`]. Requests are numbered by
//! a monotonically increasing generation, and only the result of the
//! latest generation may be published. A slow composite that finishes
//! after a newer one was requested is discarded.

use std::fmt;

use crate::blend::BlendMode;
use crate::composite;
use crate::decode::ImageHandle;
use crate::types::{BlendParams, CanvasSize, CompositeOutput, Opacity, PipelineError, RgbaImage};

/// Which layer an image occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Bottom layer, drawn first.
    A,
    /// Top layer, drawn with the blend mode and opacity.
    B,
}

impl Slot {
    /// Both slots, bottom first.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Short name for headings and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "Image A",
            Self::B => "Image B",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse session state, derived from which slots are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image has been finalized.
    Empty,
    /// Exactly one image has been finalized.
    AwaitingSecondImage,
    /// Both images are present; a composite can be produced.
    Ready,
}

/// Everything needed to render one composite, detached from the session.
#[derive(Debug, Clone)]
pub struct CompositeRequest {
    /// Generation this request was issued under.
    pub generation: u64,
    /// Bottom layer.
    pub a: ImageHandle,
    /// Top layer.
    pub b: ImageHandle,
    /// Parameters to render with.
    pub params: BlendParams,
}

impl CompositeRequest {
    /// Render and encode the composite.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`composite::composite_png`].
    pub fn run(&self) -> Result<CompositeOutput, PipelineError> {
        composite::composite_png(self.a.pixels(), self.b.pixels(), self.params)
    }
}

/// What [`Session::publish`] did with a finished composite.
#[derive(Debug)]
pub enum PublishOutcome {
    /// The result became the current composite.
    Published,
    /// A newer request was issued; the result was discarded.
    Stale,
    /// The composite failed; the previous result is still current.
    Failed(PipelineError),
}

/// Owned state of one editing session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    a: Option<ImageHandle>,
    b: Option<ImageHandle>,
    params: BlendParams,
    generation: u64,
    result: Option<CompositeOutput>,
}

impl Session {
    /// A fresh session with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        match (&self.a, &self.b) {
            (Some(_), Some(_)) => SessionState::Ready,
            (None, None) => SessionState::Empty,
            _ => SessionState::AwaitingSecondImage,
        }
    }

    /// The finalized still in `slot`, if any.
    #[must_use]
    pub const fn image(&self, slot: Slot) -> Option<&ImageHandle> {
        match slot {
            Slot::A => self.a.as_ref(),
            Slot::B => self.b.as_ref(),
        }
    }

    /// Current blend parameters.
    #[must_use]
    pub const fn params(&self) -> BlendParams {
        self.params
    }

    /// Generation of the most recently issued request (0 before any).
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The most recently published composite.
    #[must_use]
    pub const fn result(&self) -> Option<&CompositeOutput> {
        self.result.as_ref()
    }

    /// Store a cropped still in `slot`, replacing any previous one.
    ///
    /// Returns a request when both slots are now filled.
    pub fn finalize(&mut self, slot: Slot, still: RgbaImage) -> Option<CompositeRequest> {
        let handle = ImageHandle::new(still);
        log::debug!("{slot} finalized at {}", handle.dimensions());
        match slot {
            Slot::A => self.a = Some(handle),
            Slot::B => self.b = Some(handle),
        }
        self.request()
    }

    /// Change the blend mode. Returns a request when ready.
    pub fn set_blend_mode(&mut self, mode: BlendMode) -> Option<CompositeRequest> {
        self.params.blend_mode = mode;
        self.request()
    }

    /// Change the top-layer opacity. Returns a request when ready.
    pub fn set_opacity(&mut self, opacity: Opacity) -> Option<CompositeRequest> {
        self.params.opacity = opacity;
        self.request()
    }

    /// Change the canvas size. Returns a request when ready.
    ///
    /// Stored stills are not re-cropped; they are stretched to the new
    /// size when composited.
    pub fn set_canvas_size(&mut self, size: CanvasSize) -> Option<CompositeRequest> {
        self.params.canvas_size = size;
        self.request()
    }

    /// Note a rejected upload. The session is left unchanged.
    pub fn reject_upload(&self, error: &PipelineError) {
        log::warn!("upload rejected in state {:?}: {error}", self.state());
    }

    /// Issue a new request for the current inputs, if both are present.
    fn request(&mut self) -> Option<CompositeRequest> {
        let (a, b) = (self.a.as_ref()?, self.b.as_ref()?);
        self.generation += 1;
        Some(CompositeRequest {
            generation: self.generation,
            a: a.clone(),
            b: b.clone(),
            params: self.params,
        })
    }

    /// Offer a finished composite for display.
    ///
    /// Only the result of the latest generation is accepted. A failure
    /// leaves the previously published composite in place.
    pub fn publish(
        &mut self,
        generation: u64,
        result: Result<CompositeOutput, PipelineError>,
    ) -> PublishOutcome {
        if generation != self.generation {
            log::debug!(
                "discarding composite for generation {generation}, current is {}",
                self.generation
            );
            return PublishOutcome::Stale;
        }
        match result {
            Ok(output) => {
                self.result = Some(output);
                PublishOutcome::Published
            }
            Err(e) => {
                log::warn!("composite for generation {generation} failed: {e}");
                PublishOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::intake;
    use crate::types::Dimensions;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba(rgba))
    }

    fn ready_session() -> (Session, CompositeRequest) {
        let mut session = Session::new();
        assert!(session.finalize(Slot::A, solid(40, 40, [200, 150, 100, 255])).is_none());
        let request = session
            .finalize(Slot::B, solid(40, 40, [90, 120, 240, 255]))
            .unwrap();
        (session, request)
    }

    fn run_and_publish(session: &mut Session, request: &CompositeRequest) {
        let outcome = session.publish(request.generation, request.run());
        assert!(matches!(outcome, PublishOutcome::Published), "{outcome:?}");
    }

    #[test]
    fn state_follows_slot_occupancy() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.finalize(Slot::B, solid(2, 2, [0; 4])).is_none());
        assert_eq!(session.state(), SessionState::AwaitingSecondImage);
        assert!(session.finalize(Slot::A, solid(2, 2, [0; 4])).is_some());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn parameter_changes_before_ready_issue_nothing() {
        let mut session = Session::new();
        assert!(session.set_blend_mode(BlendMode::Screen).is_none());
        assert!(session.set_opacity(Opacity::new(0.4).unwrap()).is_none());
        assert_eq!(session.generation(), 0);
        assert_eq!(session.params().blend_mode, BlendMode::Screen);
    }

    #[test]
    fn every_change_when_ready_reissues() {
        let (mut session, first) = ready_session();
        let second = session.set_blend_mode(BlendMode::Overlay).unwrap();
        let third = session.set_blend_mode(BlendMode::Overlay).unwrap();
        assert!(second.generation > first.generation);
        assert!(third.generation > second.generation);
        assert_eq!(third.params.blend_mode, BlendMode::Overlay);
    }

    #[test]
    fn opacity_change_under_multiply_updates_result() {
        let (mut session, _) = ready_session();
        session.set_blend_mode(BlendMode::Multiply).unwrap();
        let low = session.set_opacity(Opacity::new(0.3).unwrap()).unwrap();
        run_and_publish(&mut session, &low);
        let before = session.result().unwrap().png.clone();

        let high = session.set_opacity(Opacity::new(0.7).unwrap()).unwrap();
        assert!(high.generation > low.generation);
        run_and_publish(&mut session, &high);

        let after = session.result().unwrap();
        assert_ne!(after.png, before);
        assert_eq!(after.params.opacity, Opacity::new(0.7).unwrap());
        assert_eq!(after.params.blend_mode, BlendMode::Multiply);
    }

    #[test]
    fn canvas_change_stretches_without_recropping() {
        let mut session = Session::new();
        session.finalize(Slot::A, solid(300, 300, [10, 20, 30, 255]));
        let first = session
            .finalize(Slot::B, solid(300, 300, [40, 50, 60, 255]))
            .unwrap();
        assert_eq!(first.params.canvas_size, CanvasSize::DEFAULT);

        let wide = CanvasSize::new(1280, 720).unwrap();
        let request = session.set_canvas_size(wide).unwrap();
        assert_eq!(request.a.dimensions(), Dimensions::new(300, 300));
        assert_eq!(request.b.dimensions(), Dimensions::new(300, 300));
        assert!(request.a.ptr_eq(session.image(Slot::A).unwrap()));

        run_and_publish(&mut session, &request);
        assert_eq!(session.result().unwrap().dimensions, Dimensions::new(1280, 720));
    }

    #[test]
    fn rejected_upload_leaves_state_unchanged() {
        let mut session = Session::new();
        session.finalize(Slot::A, solid(4, 4, [1, 2, 3, 255]));
        let generation = session.generation();

        let err = intake::check("notes.txt", b"plain text").unwrap_err();
        session.reject_upload(&err);

        assert_eq!(session.state(), SessionState::AwaitingSecondImage);
        assert!(session.image(Slot::B).is_none());
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn stale_results_are_discarded() {
        let (mut session, first) = ready_session();
        let second = session.set_blend_mode(BlendMode::Darken).unwrap();

        // The newer request finishes first.
        run_and_publish(&mut session, &second);
        let current = session.result().unwrap().clone();

        let outcome = session.publish(first.generation, first.run());
        assert!(matches!(outcome, PublishOutcome::Stale));
        assert_eq!(session.result().unwrap(), &current);
        assert_eq!(current.params.blend_mode, BlendMode::Darken);
    }

    #[test]
    fn failure_keeps_previous_result() {
        let (mut session, first) = ready_session();
        run_and_publish(&mut session, &first);
        let previous = session.result().unwrap().clone();

        let next = session.set_opacity(Opacity::new(0.5).unwrap()).unwrap();
        let outcome = session.publish(next.generation, Err(PipelineError::Encode("boom".into())));
        let PublishOutcome::Failed(err) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(matches!(err, PipelineError::Encode(_)));
        assert_eq!(session.result().unwrap(), &previous);
    }

    #[test]
    fn replacing_a_slot_reissues() {
        let (mut session, first) = ready_session();
        let request = session
            .finalize(Slot::A, solid(10, 20, [0, 0, 0, 255]))
            .unwrap();
        assert!(request.generation > first.generation);
        assert_eq!(request.a.dimensions(), Dimensions::new(10, 20));
    }
}
