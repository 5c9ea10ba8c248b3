// Snapshot publisher: copies each region out under its own lock, then draws
// with every state lock released. The sink has its own serializing lock.

use super::world::World;
use crate::domain::{BayGauge, MarkerRing, Position, PresentationSink, ProjectileView, Snapshot};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct Publisher<S> {
    world: Arc<World>,
    // Sink-serialization boundary: every call into the sink goes through this
    // lock, and it is only taken once every world region lock is released.
    sink: Mutex<S>,
    markers: MarkerRing,
    hits: Option<mpsc::Receiver<Position>>,
    frame: u64,
}

impl<S: PresentationSink> Publisher<S> {
    pub fn new(world: Arc<World>, sink: S) -> Self {
        let hits = world.take_hit_feed();
        if hits.is_none() {
            warn!("hit feed already taken; markers disabled");
        }
        Self {
            world,
            sink: Mutex::new(sink),
            markers: MarkerRing::new(),
            hits,
            frame: 0,
        }
    }

    pub fn frames_published(&self) -> u64 {
        self.frame
    }

    /// Produces and presents one frame. Sink failures are logged, never fatal.
    pub fn publish_frame(&mut self) -> Snapshot {
        self.sync_viewport();
        self.collect_hits();
        let snapshot = self.capture();

        {
            let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(error) = sink.present(&snapshot) {
                warn!(%error, frame = snapshot.frame, "present failed");
            }
        }

        self.markers.decay();
        self.frame += 1;
        snapshot
    }

    pub fn into_sink(self) -> S {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn sync_viewport(&self) {
        let measured = {
            let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
            sink.measure()
        };
        match measured {
            Ok((width, height)) => {
                if let Some(viewport) = self.world.resize_viewport(width, height) {
                    self.world.with_run(|run| run.clamp_aim(viewport.width));
                    info!(width = viewport.width, height = viewport.height, "surface resized");
                }
            }
            Err(error) => warn!(%error, "surface measure failed; keeping previous size"),
        }
    }

    fn collect_hits(&mut self) {
        let Some(hits) = self.hits.as_mut() else {
            return;
        };
        while let Ok(position) = hits.try_recv() {
            self.markers.push(position);
        }
    }

    // One region at a time; nothing borrowed survives its lock.
    fn capture(&self) -> Snapshot {
        let world = &self.world;
        let viewport = world.viewport();
        let actors = world.with_actors(|actors| {
            actors
                .iter()
                .filter(|(_, actor)| actor.alive)
                .map(|(_, actor)| actor.position)
                .collect()
        });
        let projectiles = world.with_projectiles(|projectiles| {
            projectiles
                .iter()
                .filter(|(_, projectile)| projectile.alive)
                .map(|(_, projectile)| ProjectileView {
                    position: projectile.position,
                    direction: projectile.direction,
                })
                .collect()
        });
        let bays = world.with_bays(|bays| BayGauge {
            loaded: bays.iter().filter(|bay| bay.loaded).count(),
            total: bays.len(),
        });
        let (aim, counters) = world.with_run(|run| (run.aim(), run.counters()));

        Snapshot {
            frame: self.frame,
            difficulty: world.difficulty().level,
            viewport,
            actors,
            projectiles,
            aim,
            bays,
            counters,
            markers: self.markers.markers().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::MIN_SURFACE_WIDTH;
    use crate::domain::snapshot::MARKER_LIFETIME_FRAMES;
    use crate::domain::{Actor, DifficultyLevel};
    use crate::use_cases::gate;
    use crate::use_cases::world::WorldSettings;
    use std::io;

    #[derive(Default)]
    struct Recording {
        size: (i32, i32),
        frames: Vec<Snapshot>,
        fail: bool,
    }

    impl PresentationSink for Recording {
        fn measure(&mut self) -> io::Result<(i32, i32)> {
            Ok(self.size)
        }

        fn present(&mut self, snapshot: &Snapshot) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::other("surface gone"));
            }
            self.frames.push(snapshot.clone());
            Ok(())
        }
    }

    fn world() -> Arc<World> {
        World::new(WorldSettings::new(DifficultyLevel::Medium.config()))
    }

    #[test]
    fn when_surface_shrinks_then_aim_is_clamped_into_it() {
        let world = world();
        world.with_run(|run| run.shift_aim(100, 120));
        let sink = Recording {
            size: (20, 5),
            ..Recording::default()
        };
        let mut publisher = Publisher::new(world.clone(), sink);

        let snapshot = publisher.publish_frame();

        assert_eq!(snapshot.viewport.width, MIN_SURFACE_WIDTH);
        assert_eq!(snapshot.aim.column, MIN_SURFACE_WIDTH - 1);
        assert_eq!(world.viewport().width, MIN_SURFACE_WIDTH);
    }

    #[test]
    fn when_hit_is_reported_then_marker_lives_for_its_lifetime() {
        let world = world();
        world.with_actors(|actors| actors.occupy(Actor::spawn(Position::new(5, 5))));
        let target = gate::strike_actor_near(&world, Position::new(5, 6)).expect("target in range");
        gate::credit_kill(&world, target);

        let sink = Recording {
            size: (120, 32),
            ..Recording::default()
        };
        let mut publisher = Publisher::new(world, sink);
        let first = publisher.publish_frame();
        assert_eq!(first.markers.len(), 1);
        assert!(first.actors.is_empty());

        for _ in 0..MARKER_LIFETIME_FRAMES {
            publisher.publish_frame();
        }
        let sink = publisher.into_sink();
        assert!(sink.frames.last().is_some_and(|frame| frame.markers.is_empty()));
    }

    // Reads every region from inside the sink; a lock held across a sink call
    // would deadlock here.
    struct Inspecting {
        world: Arc<World>,
        seen: Vec<(usize, u32)>,
    }

    impl PresentationSink for Inspecting {
        fn measure(&mut self) -> io::Result<(i32, i32)> {
            let viewport = self.world.viewport();
            Ok((viewport.width, viewport.height))
        }

        fn present(&mut self, _snapshot: &Snapshot) -> io::Result<()> {
            let loaded = self.world.loaded_bays();
            let population = self.world.population();
            let counters = self.world.counters();
            self.seen.push((loaded + population.actors, counters.spawned));
            Ok(())
        }
    }

    #[test]
    fn when_sink_reads_the_world_while_drawing_then_no_region_is_locked() {
        let world = world();
        world.with_actors(|actors| actors.occupy(Actor::spawn(Position::new(3, 3))));
        let sink = Inspecting {
            world: world.clone(),
            seen: Vec::new(),
        };
        let mut publisher = Publisher::new(world, sink);

        publisher.publish_frame();
        publisher.publish_frame();

        assert_eq!(publisher.into_sink().seen, vec![(1, 0), (1, 0)]);
    }

    #[test]
    fn when_sink_fails_then_publishing_continues() {
        let sink = Recording {
            size: (120, 32),
            fail: true,
            ..Recording::default()
        };
        let mut publisher = Publisher::new(world(), sink);
        publisher.publish_frame();
        publisher.publish_frame();
        assert_eq!(publisher.frames_published(), 2);
    }
}
