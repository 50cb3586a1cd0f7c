use crate::config::LoopConfig;
use crate::error::{FrameError, InitError};
use crate::gfx::{
    BlendFactor, Capability, ClearMask, Color, DepthFunc, Face, GraphicsBackend, MatrixMode,
    ShadeModel,
};
use crate::projection::ProjectionManager;
use crate::time::{Clock, SystemTimer, Timer};

use super::hooks::{Camera, Overlay, Player, Session, World};
use super::platform::{Display, Platform};

/// Lifecycle phase of a [`FrameDriver`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverPhase {
    Uninitialized,
    Running,
    Stopped,
}

/// Handles that only exist while the driver is running.
struct Live<D, G, W, P> {
    display: D,
    gfx: G,
    world: W,
    player: P,
    /// Drawable size the graphics backend was last sized for.
    size: (u32, u32),
}

enum DriverState<D, G, W, P> {
    Uninitialized,
    Running(Live<D, G, W, P>),
    Stopped,
}

/// Owns the frame loop: render pass, update pass, present, pacing wait.
///
/// ```text
/// Uninitialized --initialize()--> Running --shutdown()--> Stopped
/// ```
///
/// The loop is single-threaded. The only blocking call is
/// [`Display::sync_to`] at the end of each iteration, and the only exit is the
/// display's close request, checked once at the top of every iteration.
pub struct FrameDriver<Pf, S, O, T = SystemTimer>
where
    Pf: Platform,
    S: Session,
    O: Overlay<S::Player>,
    T: Timer,
{
    config: LoopConfig,
    platform: Pf,
    session: S,
    overlay: O,
    clock: Clock<T>,
    projection: ProjectionManager,
    state: DriverState<Pf::Display, Pf::Graphics, S::World, S::Player>,
}

impl<Pf, S, O> FrameDriver<Pf, S, O, SystemTimer>
where
    Pf: Platform,
    S: Session,
    O: Overlay<S::Player>,
{
    /// Creates a driver timed by the system's monotonic clock.
    pub fn new(
        config: LoopConfig,
        platform: Pf,
        session: S,
        overlay: O,
    ) -> Result<Self, InitError> {
        Self::with_timer(config, platform, session, overlay, SystemTimer::new())
    }
}

impl<Pf, S, O, T> FrameDriver<Pf, S, O, T>
where
    Pf: Platform,
    S: Session,
    O: Overlay<S::Player>,
    T: Timer,
{
    /// Creates a driver timed by `timer`. Fails if the timer is unusable.
    pub fn with_timer(
        config: LoopConfig,
        platform: Pf,
        session: S,
        overlay: O,
        timer: T,
    ) -> Result<Self, InitError> {
        Ok(Self {
            config,
            platform,
            session,
            overlay,
            clock: Clock::new(timer)?,
            projection: ProjectionManager::new(),
            state: DriverState::Uninitialized,
        })
    }

    pub fn phase(&self) -> DriverPhase {
        match self.state {
            DriverState::Uninitialized => DriverPhase::Uninitialized,
            DriverState::Running(_) => DriverPhase::Running,
            DriverState::Stopped => DriverPhase::Stopped,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock<T> {
        &self.clock
    }

    pub fn projection(&self) -> &ProjectionManager {
        &self.projection
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    fn live(&self) -> Option<&Live<Pf::Display, Pf::Graphics, S::World, S::Player>> {
        match &self.state {
            DriverState::Running(live) => Some(live),
            _ => None,
        }
    }

    pub fn display(&self) -> Option<&Pf::Display> {
        self.live().map(|l| &l.display)
    }

    pub fn graphics(&self) -> Option<&Pf::Graphics> {
        self.live().map(|l| &l.gfx)
    }

    pub fn world(&self) -> Option<&S::World> {
        self.live().map(|l| &l.world)
    }

    pub fn player(&self) -> Option<&S::Player> {
        self.live().map(|l| &l.player)
    }

    /// Brings the system up and moves to [`DriverPhase::Running`].
    ///
    /// On error the driver stays uninitialized and any opened display is
    /// released; the loop must not be entered.
    pub fn initialize(&mut self) -> Result<(), InitError> {
        if !matches!(self.state, DriverState::Uninitialized) {
            return Err(InitError::AlreadyInitialized);
        }

        let window = &self.config.window;
        log::info!(
            "opening display {}x{} \"{}\" (vsync: {})",
            window.width,
            window.height,
            window.title,
            window.vsync
        );
        let (mut display, mut gfx) = self.platform.open(window)?;

        configure_fixed_state(&mut gfx);

        let (width, height) = display.size();
        let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };

        let mut world = self.session.create_world();
        let mut player = self.session.create_player(aspect);
        world.add(&mut player);
        world.move_to(&mut player, self.session.spawn_position());

        player.camera().apply_perspective_transform(&mut gfx);
        self.projection.capture_perspective(&mut gfx);
        self.projection.capture_orthographic(&mut gfx, width, height);
        player.camera().apply_perspective_transform(&mut gfx);

        // Texturing and the clear values come after the world is set up.
        gfx.enable(Capability::Texture2d);
        gfx.clear_color(Color::new(0.0, 0.0, 0.0, 0.5));
        gfx.clear_depth(1.0);

        if self.config.grab_cursor {
            display.set_cursor_grabbed(true);
        }

        // Discard the time since the timer origin so the first frame reads sanely.
        self.clock.delta();

        if let Err(err) = self.overlay.load(&mut gfx, (width, height)) {
            display.destroy();
            return Err(err);
        }

        self.state = DriverState::Running(Live {
            display,
            gfx,
            world,
            player,
            size: (width, height),
        });
        log::info!("frame driver running at {} updates/s", self.config.update_rate);
        Ok(())
    }

    /// Runs frames until the display reports a close request.
    ///
    /// A close request raised during an iteration is observed at the top of
    /// the next one, so the current render + update pass always completes.
    /// The first [`FrameError`] stops the loop and is returned.
    pub fn run_loop(&mut self) -> Result<(), FrameError> {
        let rate = self.config.update_rate;
        let mut frames: u64 = 0;

        loop {
            let DriverState::Running(live) = &mut self.state else {
                return Err(FrameError::NotRunning);
            };
            if live.display.close_requested() {
                break;
            }

            // The overlay keeps its captured projection and scales with the window.
            let size = live.display.size();
            if size != live.size {
                log::info!("display resized to {}x{}", size.0, size.1);
                live.gfx.resize(size.0, size.1);
                live.size = size;
            }

            self.render_frame()?;
            self.update_frame()?;

            let DriverState::Running(live) = &mut self.state else {
                return Err(FrameError::NotRunning);
            };
            live.gfx.present()?;
            live.display.sync_to(rate);

            frames += 1;
            log::trace!("frame {frames} complete");
        }

        log::info!("close requested after {frames} frames");
        Ok(())
    }

    /// Clears the frame and draws the screen-space overlay.
    ///
    /// Reads simulation state only.
    pub fn render_frame(&mut self) -> Result<(), FrameError> {
        let DriverState::Running(live) = &mut self.state else {
            return Err(FrameError::NotRunning);
        };
        let gfx: &mut dyn GraphicsBackend = &mut live.gfx;

        gfx.clear(ClearMask::COLOR_DEPTH);

        self.projection.begin_overlay(gfx)?;
        gfx.disable(Capability::Lighting);

        self.overlay.draw_crosshair(gfx)?;

        if live.world.paused() {
            self.overlay.draw_pause_menu(gfx, &live.player)?;
        }

        if live.player.debug_menu() {
            let fps = self.clock.frames_per_second();
            self.overlay.draw_debug_menu(gfx, &live.player, fps)?;
        }

        gfx.enable(Capability::Lighting);
        self.projection.end_overlay(gfx, live.player.camera())?;
        expect_modelview(gfx)
    }

    /// Advances the simulation one step and recomputes the camera.
    ///
    /// Player first, then the world that consumes player state, then the
    /// camera so the next render sees a settled view transform.
    pub fn update_frame(&mut self) -> Result<(), FrameError> {
        let DriverState::Running(live) = &mut self.state else {
            return Err(FrameError::NotRunning);
        };

        live.player.player_update();
        live.world.update();

        expect_modelview(&live.gfx)?;
        live.gfx.load_identity();
        live.player.camera_update(&mut live.gfx);
        Ok(())
    }

    /// Releases the display and session handles. Idempotent.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.state, DriverState::Stopped) {
            DriverState::Running(mut live) => {
                live.display.destroy();
                log::info!("frame driver stopped");
            }
            DriverState::Uninitialized => log::debug!("shutdown before initialize"),
            DriverState::Stopped => {}
        }
    }
}

impl<Pf, S, O, T> Drop for FrameDriver<Pf, S, O, T>
where
    Pf: Platform,
    S: Session,
    O: Overlay<S::Player>,
    T: Timer,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cameras must hand back model/view; anything else would edit the projection stack.
fn expect_modelview(gfx: &dyn GraphicsBackend) -> Result<(), FrameError> {
    match gfx.current_matrix_mode() {
        MatrixMode::ModelView => Ok(()),
        mode => Err(FrameError::Collaborator(format!(
            "camera left {mode:?} selected instead of model/view"
        ))),
    }
}

/// Fixed pipeline state for the whole session.
fn configure_fixed_state(gfx: &mut dyn GraphicsBackend) {
    gfx.enable(Capability::Normalize);
    gfx.shade_model(ShadeModel::Smooth);

    gfx.enable(Capability::Blend);
    gfx.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);

    gfx.enable(Capability::RescaleNormal);

    gfx.enable(Capability::DepthTest);
    gfx.depth_func(DepthFunc::LessEqual);

    gfx.enable(Capability::Lighting);

    gfx.enable(Capability::CullFace);
    gfx.cull_face(Face::Back);

    gfx.enable(Capability::ColorMaterial);
    gfx.color_material(Face::Front);
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use nalgebra::{Point3, Vector3};

    use super::*;
    use crate::config::WindowConfig;
    use crate::gfx::{Call, FontId, Mat4, RecordingBackend, TextStyle};
    use crate::time::ManualTimer;

    // ── fakes ─────────────────────────────────────────────────────────────

    #[derive(Default, Clone)]
    struct Signals {
        close: Rc<Cell<bool>>,
        destroyed: Rc<Cell<u32>>,
    }

    struct FakeDisplay {
        size: (u32, u32),
        resize_at: Option<(usize, (u32, u32))>,
        close_after: Option<usize>,
        checks: usize,
        syncs: Vec<u32>,
        grabbed: bool,
        timer: ManualTimer,
        tick_per_sync: u64,
        signals: Signals,
    }

    impl Display for FakeDisplay {
        fn close_requested(&mut self) -> bool {
            self.checks += 1;
            match self.resize_at {
                Some((check, size)) if check == self.checks => self.size = size,
                _ => {}
            }
            let by_count = self.close_after.is_some_and(|n| self.checks > n);
            by_count || self.signals.close.get()
        }

        fn sync_to(&mut self, rate: u32) {
            self.syncs.push(rate);
            self.timer.advance(self.tick_per_sync);
        }

        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn set_cursor_grabbed(&mut self, grabbed: bool) {
            self.grabbed = grabbed;
        }

        fn destroy(&mut self) {
            self.signals.destroyed.set(self.signals.destroyed.get() + 1);
        }
    }

    struct FakePlatform {
        fail: bool,
        close_after: Option<usize>,
        resize_at: Option<(usize, (u32, u32))>,
        timer: ManualTimer,
        tick_per_sync: u64,
        signals: Signals,
    }

    impl FakePlatform {
        fn new(timer: &ManualTimer) -> Self {
            Self {
                fail: false,
                close_after: None,
                resize_at: None,
                timer: timer.clone(),
                tick_per_sync: 0,
                signals: Signals::default(),
            }
        }
    }

    impl Platform for FakePlatform {
        type Display = FakeDisplay;
        type Graphics = RecordingBackend;

        fn open(
            &mut self,
            config: &WindowConfig,
        ) -> Result<(FakeDisplay, RecordingBackend), InitError> {
            if self.fail {
                return Err(InitError::Display("no display available".to_string()));
            }
            let display = FakeDisplay {
                size: (config.width, config.height),
                resize_at: self.resize_at,
                close_after: self.close_after,
                checks: 0,
                syncs: Vec::new(),
                grabbed: false,
                timer: self.timer.clone(),
                tick_per_sync: self.tick_per_sync,
                signals: self.signals.clone(),
            };
            Ok((display, RecordingBackend::new()))
        }
    }

    struct TestCamera {
        projection: Mat4,
        // Breaks the camera contract by leaving the projection stack selected.
        stays_in_projection: bool,
    }

    impl Camera for TestCamera {
        fn apply_perspective_transform(&self, gfx: &mut dyn GraphicsBackend) {
            gfx.matrix_mode(MatrixMode::Projection);
            gfx.load_matrix(&self.projection);
            if !self.stays_in_projection {
                gfx.matrix_mode(MatrixMode::ModelView);
            }
        }
    }

    struct TestPlayer {
        camera: TestCamera,
        position: Point3<f32>,
        registered: bool,
        debug: bool,
        order: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Player for TestPlayer {
        type Camera = TestCamera;

        fn player_update(&mut self) {
            self.order.borrow_mut().push("player");
        }

        fn camera_update(&mut self, gfx: &mut dyn GraphicsBackend) {
            self.order.borrow_mut().push("camera");
            gfx.mult_matrix(&Mat4::new_translation(&-self.position.coords));
        }

        fn camera(&self) -> &TestCamera {
            &self.camera
        }

        fn position(&self) -> Point3<f32> {
            self.position
        }

        fn debug_menu(&self) -> bool {
            self.debug
        }
    }

    struct TestWorld {
        paused: bool,
        members: usize,
        close_on_update: Option<u32>,
        updates: u32,
        close: Rc<Cell<bool>>,
        order: Rc<RefCell<Vec<&'static str>>>,
    }

    impl World<TestPlayer> for TestWorld {
        fn add(&mut self, member: &mut TestPlayer) {
            member.registered = true;
            self.members += 1;
        }

        fn move_to(&mut self, member: &mut TestPlayer, position: Point3<f32>) {
            member.position = position;
        }

        fn update(&mut self) {
            self.updates += 1;
            self.order.borrow_mut().push("world");
            if self.close_on_update == Some(self.updates) {
                self.close.set(true);
            }
        }

        fn paused(&self) -> bool {
            self.paused
        }
    }

    #[derive(Default)]
    struct TestSession {
        paused: bool,
        debug: bool,
        sloppy_camera: bool,
        close_on_update: Option<u32>,
        close: Rc<Cell<bool>>,
        order: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Session for TestSession {
        type Player = TestPlayer;
        type World = TestWorld;

        fn create_world(&mut self) -> TestWorld {
            TestWorld {
                paused: self.paused,
                members: 0,
                close_on_update: self.close_on_update,
                updates: 0,
                close: self.close.clone(),
                order: self.order.clone(),
            }
        }

        fn create_player(&mut self, aspect: f32) -> TestPlayer {
            TestPlayer {
                camera: TestCamera {
                    projection: Mat4::new_perspective(aspect, 70f32.to_radians(), 0.1, 500.0),
                    stays_in_projection: self.sloppy_camera,
                },
                position: Point3::origin(),
                registered: false,
                debug: self.debug,
                order: self.order.clone(),
            }
        }

        fn spawn_position(&self) -> Point3<f32> {
            Point3::new(5.0, 5.0, 5.0)
        }
    }

    #[derive(Default)]
    struct CountingOverlay {
        font: Option<FontId>,
        fail_load: bool,
        fail_crosshair: bool,
        crosshairs: Cell<u32>,
        pauses: Cell<u32>,
        debugs: Cell<u32>,
        fps: RefCell<Vec<Option<f32>>>,
    }

    impl CountingOverlay {
        fn font(&self) -> Result<FontId, FrameError> {
            self.font.ok_or_else(|| FrameError::Collaborator("font not loaded".to_string()))
        }
    }

    impl Overlay<TestPlayer> for CountingOverlay {
        fn load(&mut self, gfx: &mut dyn GraphicsBackend, _: (u32, u32)) -> Result<(), InitError> {
            if self.fail_load {
                return Err(InitError::Font("missing".to_string()));
            }
            self.font = Some(gfx.load_font(b"test font")?);
            Ok(())
        }

        fn draw_crosshair(&self, gfx: &mut dyn GraphicsBackend) -> Result<(), FrameError> {
            if self.fail_crosshair {
                return Err(FrameError::Collaborator("crosshair".to_string()));
            }
            self.crosshairs.set(self.crosshairs.get() + 1);
            gfx.draw_text(self.font()?, 640.0, 360.0, "+", TextStyle::default())
        }

        fn draw_pause_menu(
            &self,
            gfx: &mut dyn GraphicsBackend,
            _: &TestPlayer,
        ) -> Result<(), FrameError> {
            self.pauses.set(self.pauses.get() + 1);
            gfx.draw_text(self.font()?, 10.0, 10.0, "Paused", TextStyle::default())
        }

        fn draw_debug_menu(
            &self,
            gfx: &mut dyn GraphicsBackend,
            _: &TestPlayer,
            fps: Option<f32>,
        ) -> Result<(), FrameError> {
            self.debugs.set(self.debugs.get() + 1);
            self.fps.borrow_mut().push(fps);
            gfx.draw_text(self.font()?, 10.0, 30.0, "debug", TextStyle::default())
        }
    }

    type TestDriver = FrameDriver<FakePlatform, TestSession, CountingOverlay, ManualTimer>;

    fn driver(platform: FakePlatform, session: TestSession, timer: &ManualTimer) -> TestDriver {
        FrameDriver::with_timer(
            LoopConfig::default(),
            platform,
            session,
            CountingOverlay::default(),
            timer.clone(),
        )
        .unwrap()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn unusable_timer_is_fatal() {
        let timer = ManualTimer::with_resolution(0);
        let result = FrameDriver::with_timer(
            LoopConfig::default(),
            FakePlatform::new(&timer),
            TestSession::default(),
            CountingOverlay::default(),
            timer.clone(),
        );
        assert!(matches!(result, Err(InitError::Timer)));
    }

    #[test]
    fn initialize_sets_up_session_and_projections() {
        let timer = ManualTimer::millis();
        timer.set(5000);
        let mut d = driver(FakePlatform::new(&timer), TestSession::default(), &timer);

        assert_eq!(d.phase(), DriverPhase::Uninitialized);
        d.initialize().unwrap();
        assert_eq!(d.phase(), DriverPhase::Running);

        let player = d.player().unwrap();
        assert!(player.registered);
        assert_eq!(player.position(), Point3::new(5.0, 5.0, 5.0));
        assert_eq!(d.world().unwrap().members, 1);
        assert!(d.display().unwrap().grabbed);

        let gfx = d.graphics().unwrap();
        let state = gfx.state();
        for cap in [
            Capability::Blend,
            Capability::DepthTest,
            Capability::Lighting,
            Capability::CullFace,
            Capability::Texture2d,
        ] {
            assert!(state.is_enabled(cap), "{cap:?} should be enabled");
        }
        assert_eq!(state.depth_func(), DepthFunc::LessEqual);
        assert_eq!(state.blend_func(), (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha));

        // Perspective snapshot is the camera's; it is active in model/view mode.
        assert_eq!(*d.projection().perspective(), player.camera().projection);
        assert_eq!(*state.matrix(MatrixMode::Projection), player.camera().projection);
        assert_eq!(state.matrix_mode(), MatrixMode::ModelView);

        // Clock primed at the current time, font loaded.
        assert_eq!(d.clock().last_frame(), 5000);
        assert!(d.overlay().font.is_some());
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let timer = ManualTimer::millis();
        let mut d = driver(FakePlatform::new(&timer), TestSession::default(), &timer);
        d.initialize().unwrap();
        assert!(matches!(d.initialize(), Err(InitError::AlreadyInitialized)));
    }

    #[test]
    fn display_failure_is_fatal_and_leaves_driver_uninitialized() {
        let timer = ManualTimer::millis();
        let mut platform = FakePlatform::new(&timer);
        platform.fail = true;
        let mut d = driver(platform, TestSession::default(), &timer);

        assert!(matches!(d.initialize(), Err(InitError::Display(_))));
        assert_eq!(d.phase(), DriverPhase::Uninitialized);
        assert!(matches!(d.run_loop(), Err(FrameError::NotRunning)));
    }

    #[test]
    fn font_failure_releases_display() {
        let timer = ManualTimer::millis();
        let platform = FakePlatform::new(&timer);
        let signals = platform.signals.clone();
        let mut d = FrameDriver::with_timer(
            LoopConfig::default(),
            platform,
            TestSession::default(),
            CountingOverlay { fail_load: true, ..Default::default() },
            timer.clone(),
        )
        .unwrap();

        assert!(matches!(d.initialize(), Err(InitError::Font(_))));
        assert_eq!(d.phase(), DriverPhase::Uninitialized);
        assert_eq!(signals.destroyed.get(), 1);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let timer = ManualTimer::millis();
        let platform = FakePlatform::new(&timer);
        let signals = platform.signals.clone();
        let mut d = driver(platform, TestSession::default(), &timer);
        d.initialize().unwrap();

        d.shutdown();
        assert_eq!(d.phase(), DriverPhase::Stopped);
        d.shutdown();
        assert_eq!(d.phase(), DriverPhase::Stopped);
        drop(d);
        assert_eq!(signals.destroyed.get(), 1);
    }

    #[test]
    fn frame_passes_require_running_driver() {
        let timer = ManualTimer::millis();
        let mut d = driver(FakePlatform::new(&timer), TestSession::default(), &timer);
        assert!(matches!(d.render_frame(), Err(FrameError::NotRunning)));
        assert!(matches!(d.update_frame(), Err(FrameError::NotRunning)));
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn eighty_paced_frames_over_one_second() {
        let timer = ManualTimer::with_resolution(1_000_000); // microseconds
        let mut platform = FakePlatform::new(&timer);
        platform.close_after = Some(80);
        platform.tick_per_sync = 12_500;
        let session = TestSession { debug: true, ..Default::default() };
        let mut d = driver(platform, session, &timer);

        d.initialize().unwrap();
        d.run_loop().unwrap();

        let display = d.display().unwrap();
        assert_eq!(display.syncs.len(), 80);
        assert!(display.syncs.iter().all(|&r| r == 80));
        assert_eq!(d.clock().now(), 1000);
        assert_eq!(d.graphics().unwrap().frames(), 80);

        let fps = d.overlay().fps.borrow();
        assert_eq!(fps.len(), 80);
        // First reading lands in the same millisecond as the priming delta.
        assert_eq!(fps[0], None);
        for reading in &fps[1..] {
            let rate = reading.expect("time advanced between frames");
            assert!(rate.is_finite() && rate > 0.0);
        }
    }

    #[test]
    fn paused_world_draws_pause_menu_once_per_frame() {
        let timer = ManualTimer::millis();
        let mut platform = FakePlatform::new(&timer);
        platform.close_after = Some(5);
        let session = TestSession { paused: true, debug: false, ..Default::default() };
        let mut d = driver(platform, session, &timer);

        d.initialize().unwrap();
        d.run_loop().unwrap();

        let overlay = d.overlay();
        assert_eq!(overlay.crosshairs.get(), 5);
        assert_eq!(overlay.pauses.get(), 5);
        assert_eq!(overlay.debugs.get(), 0);
    }

    #[test]
    fn close_during_update_finishes_the_iteration() {
        let timer = ManualTimer::millis();
        let session = TestSession { close_on_update: Some(3), ..Default::default() };
        let mut platform = FakePlatform::new(&timer);
        platform.signals.close = session.close.clone();
        let mut d = driver(platform, session, &timer);

        d.initialize().unwrap();
        d.run_loop().unwrap();

        assert_eq!(d.overlay().crosshairs.get(), 3);
        assert_eq!(d.world().unwrap().updates, 3);
        assert_eq!(d.display().unwrap().syncs.len(), 3);
        assert_eq!(d.display().unwrap().checks, 4);
    }

    #[test]
    fn render_brackets_overlay_and_toggles_lighting() {
        let timer = ManualTimer::millis();
        let mut d = driver(FakePlatform::new(&timer), TestSession::default(), &timer);
        d.initialize().unwrap();

        let snapshot = |s: &crate::gfx::FixedFunctionState| {
            (
                s.matrix_mode(),
                *s.matrix(MatrixMode::Projection),
                s.stack_depth(MatrixMode::ModelView),
            )
        };
        let gfx_state_before = snapshot(d.graphics().unwrap().state());

        d.render_frame().unwrap();

        let gfx = d.graphics().unwrap();
        let calls = gfx.calls();
        let clear = calls.iter().rposition(|c| *c == Call::Clear(ClearMask::COLOR_DEPTH)).unwrap();
        let push = calls.iter().rposition(|c| *c == Call::PushMatrix).unwrap();
        let off = calls.iter().rposition(|c| *c == Call::Disable(Capability::Lighting)).unwrap();
        let text = calls.iter().rposition(|c| matches!(c, Call::DrawText { .. })).unwrap();
        let on = calls.iter().rposition(|c| *c == Call::Enable(Capability::Lighting)).unwrap();
        let pop = calls.iter().rposition(|c| *c == Call::PopMatrix).unwrap();
        assert!(clear < push && push < off && off < text && text < on && on < pop);

        let s = gfx.state();
        assert_eq!(snapshot(s), gfx_state_before);
        assert!(s.is_enabled(Capability::Lighting));
    }

    #[test]
    fn update_runs_player_world_then_camera_on_fresh_modelview() {
        let timer = ManualTimer::millis();
        let session = TestSession::default();
        let order = session.order.clone();
        let mut d = driver(FakePlatform::new(&timer), session, &timer);
        d.initialize().unwrap();

        d.update_frame().unwrap();
        d.update_frame().unwrap();

        assert_eq!(
            *order.borrow(),
            vec!["player", "world", "camera", "player", "world", "camera"]
        );

        let view = Mat4::new_translation(&Vector3::new(-5.0, -5.0, -5.0));
        let state = d.graphics().unwrap().state();
        assert_eq!(*state.matrix(MatrixMode::ModelView), view);
    }

    #[test]
    fn overlay_failure_stops_the_loop() {
        let timer = ManualTimer::millis();
        let mut platform = FakePlatform::new(&timer);
        platform.close_after = Some(10);
        let mut d = FrameDriver::with_timer(
            LoopConfig::default(),
            platform,
            TestSession::default(),
            CountingOverlay { fail_crosshair: true, ..Default::default() },
            timer.clone(),
        )
        .unwrap();
        d.initialize().unwrap();

        assert!(matches!(d.run_loop(), Err(FrameError::Collaborator(_))));
        assert!(d.display().unwrap().syncs.is_empty());
        assert_eq!(d.graphics().unwrap().frames(), 0);
    }

    #[test]
    fn camera_leaving_projection_selected_fails_the_frame() {
        let timer = ManualTimer::millis();
        let mut platform = FakePlatform::new(&timer);
        platform.close_after = Some(10);
        let session = TestSession { sloppy_camera: true, ..Default::default() };
        let mut d = driver(platform, session, &timer);
        d.initialize().unwrap();

        assert!(matches!(d.update_frame(), Err(FrameError::Collaborator(_))));
        assert!(matches!(d.run_loop(), Err(FrameError::Collaborator(_))));

        // The projection stack is never overwritten by the model/view reset.
        let gfx = d.graphics().unwrap();
        assert_eq!(
            *gfx.state().matrix(MatrixMode::Projection),
            d.player().unwrap().camera().projection
        );
        assert_eq!(gfx.frames(), 0);
    }

    #[test]
    fn display_resize_reaches_the_backend_once() {
        let timer = ManualTimer::millis();
        let mut platform = FakePlatform::new(&timer);
        platform.close_after = Some(4);
        platform.resize_at = Some((2, (1920, 1080)));
        let mut d = driver(platform, TestSession::default(), &timer);
        d.initialize().unwrap();
        d.run_loop().unwrap();

        let resizes: Vec<&Call> = d
            .graphics()
            .unwrap()
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Resize(..)))
            .collect();
        assert_eq!(resizes, vec![&Call::Resize(1920, 1080)]);
        assert_eq!(d.graphics().unwrap().frames(), 4);
    }
}
