use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use camsync::{CameraController, CameraRig};

/// Fixed-cadence driver for the consuming side.
pub struct CameraLoop<R> {
    controller: CameraController<R>,
    tick_duration: Duration,
    last_tick_time: Instant,
    accumulator: Duration,
    tick: u64,
    running: Arc<AtomicBool>,
}

impl<R: CameraRig> CameraLoop<R> {
    pub fn new(controller: CameraController<R>, tick_duration: Duration) -> Self {
        Self {
            controller,
            tick_duration,
            last_tick_time: Instant::now(),
            accumulator: Duration::ZERO,
            tick: 0,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn controller(&self) -> &CameraController<R> {
        &self.controller
    }

    pub fn run(&mut self) {
        while self.running.load(Ordering::SeqCst) {
            self.tick_once();
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn tick_once(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_tick_time;
        self.last_tick_time = now;
        self.accumulator += delta;

        while self.accumulator >= self.tick_duration {
            self.accumulator -= self.tick_duration;
            self.step();
        }
    }

    fn step(&mut self) {
        self.tick += 1;
        let applied = self.controller.step();
        if applied > 0 {
            let pose = self.controller.rig().pose();
            let r = pose.orientation;
            log::info!(
                "tick {}: applied {} instruction(s), position {:.4}, rotation ({:.4}, {:.4}, {:.4}, {:.4})",
                self.tick,
                applied,
                pose.position,
                r.axis.x,
                r.axis.y,
                r.axis.z,
                r.angle
            );
        }
    }
}
