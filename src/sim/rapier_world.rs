//! rapier2d-backed physics world
//!
//! Screen coordinates throughout: y grows downward, so gravity is +y.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::geometry::{CollisionEvent, CollisionEventFlags};
use rapier2d::pipeline::{ActiveEvents, EventHandler};
use rapier2d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, ContactPair, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Point, QueryPipeline,
    Real, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType, Vector,
};

use super::body::{BladeSpawn, BodyId, BodyKind, BodyView};
use super::physics::{CollisionStart, PhysicsError, PhysicsWorld};
use super::terrain::Polygon;

/// Points closer than this are merged before decomposition
const WELD_DISTANCE: Real = 1e-3;

struct CollisionEventCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl CollisionEventCollector {
    fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        if let Ok(mut events) = self.started.lock() {
            std::mem::take(&mut *events)
        } else {
            Vec::new()
        }
    }
}

impl EventHandler for CollisionEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(a, b, flags) = event {
            if flags.contains(CollisionEventFlags::SENSOR) {
                return;
            }
            if let Ok(mut events) = self.started.lock() {
                events.push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: RigidBodyHandle,
    kind: BodyKind,
}

pub struct RapierWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: CollisionEventCollector,
    entries: BTreeMap<BodyId, Entry>,
    collider_ids: HashMap<ColliderHandle, BodyId>,
    next_id: u64,
}

impl RapierWorld {
    /// Empty world with downward gravity in pixels/s²
    pub fn new(gravity: f32) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: Vector::new(0.0, gravity),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: CollisionEventCollector::new(),
            entries: BTreeMap::new(),
            collider_ids: HashMap::new(),
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    fn view(&self, id: BodyId, entry: &Entry) -> Option<BodyView> {
        let body = self.bodies.get(entry.handle)?;
        let t = body.translation();
        let v = body.linvel();
        Some(BodyView {
            id,
            kind: entry.kind,
            pos: Vec2::new(t.x, t.y),
            angle: body.rotation().angle(),
            linvel: Vec2::new(v.x, v.y),
            angvel: body.angvel(),
        })
    }
}

/// Outline vertices with consecutive duplicates and the closing duplicate removed
fn welded_outline(polygon: &Polygon) -> Vec<Point<Real>> {
    let mut verts: Vec<Point<Real>> = Vec::with_capacity(polygon.points().len());
    for p in polygon.points() {
        let pt = Point::new(p.x, p.y);
        if verts.last().is_none_or(|last| (last - pt).norm() > WELD_DISTANCE) {
            verts.push(pt);
        }
    }
    while verts.len() > 1 {
        match (verts.first(), verts.last()) {
            (Some(first), Some(last)) if (first - last).norm() <= WELD_DISTANCE => {
                verts.pop();
            }
            _ => break,
        }
    }
    verts
}

impl PhysicsWorld for RapierWorld {
    fn insert_terrain(&mut self, polygon: &Polygon) -> Result<BodyId, PhysicsError> {
        let verts = welded_outline(polygon);
        if verts.len() < 3 {
            return Err(PhysicsError::DegenerateTerrain(verts.len()));
        }
        let n = verts.len() as u32;
        let indices: Vec<[u32; 2]> = (0..n).map(|i| [i, (i + 1) % n]).collect();

        let collider = ColliderBuilder::convex_decomposition(&verts, &indices)
            .friction(0.8)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let parts = collider.shape().as_compound().map_or(0, |c| c.shapes().len());
        if parts == 0 {
            return Err(PhysicsError::Decomposition);
        }

        let handle = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let collider_handle = self
            .colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        let id = self.alloc_id();
        self.entries.insert(
            id,
            Entry {
                handle,
                kind: BodyKind::Terrain,
            },
        );
        self.collider_ids.insert(collider_handle, id);
        log::debug!("Terrain body {:?}: {} vertices, {} convex parts", id, n, parts);
        Ok(id)
    }

    fn spawn_blade(&mut self, spawn: &BladeSpawn) -> BodyId {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(spawn.pos.x, spawn.pos.y))
            .rotation(spawn.angle)
            .angvel(spawn.angvel)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(spawn.size.x * 0.5, spawn.size.y * 0.5)
            .density(spawn.density)
            .friction(0.6)
            .restitution(0.1)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle = self
            .colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        let id = self.alloc_id();
        self.entries.insert(
            id,
            Entry {
                handle,
                kind: BodyKind::FallingBlade,
            },
        );
        self.collider_ids.insert(collider_handle, id);
        id
    }

    fn remove_body(&mut self, id: BodyId) {
        let Some(entry) = self.entries.remove(&id) else {
            return;
        };
        self.collider_ids.retain(|_, owner| *owner != id);
        let _ = self.bodies.remove(
            entry.handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    fn clear(&mut self) {
        let ids: Vec<BodyId> = self.entries.keys().copied().collect();
        for id in ids {
            self.remove_body(id);
        }
        let _ = self.event_collector.drain();
    }

    fn pin(&mut self, id: BodyId) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        if entry.kind != BodyKind::FallingBlade {
            return false;
        }
        let Some(body) = self.bodies.get_mut(entry.handle) else {
            return false;
        };
        body.set_linvel(Vector::zeros(), false);
        body.set_angvel(0.0, false);
        body.set_body_type(RigidBodyType::Fixed, true);
        entry.kind = BodyKind::PinnedBlade;
        true
    }

    fn body(&self, id: BodyId) -> Option<BodyView> {
        let entry = self.entries.get(&id)?;
        self.view(id, entry)
    }

    fn bodies(&self) -> Vec<BodyView> {
        self.entries
            .iter()
            .filter_map(|(&id, entry)| self.view(id, entry))
            .collect()
    }

    fn step(&mut self, dt: f32) -> Vec<CollisionStart> {
        self.integration_parameters.dt = dt;
        let hooks = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &hooks,
            &self.event_collector,
        );

        self.event_collector
            .drain()
            .into_iter()
            .filter_map(|(a, b)| {
                let a = *self.collider_ids.get(&a)?;
                let b = *self.collider_ids.get(&b)?;
                Some(CollisionStart { a, b })
            })
            .collect()
    }
}
