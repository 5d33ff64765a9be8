use anyhow::{Context, Result};
use glam::Vec3;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::camera::CameraController;
use crate::cat::{Cat, MoveIntent, CAT_HALF_EXTENTS, DEFAULT_FUR};
use crate::collision::{bounds_at, push_out_of_solids};
use crate::config::GameConfig;
use crate::cookie::Cookie;
use crate::input::{Action, Bindings, InputState};
use crate::level::Level;
use crate::net::{MoveThrottle, NetEvent};
use crate::projectile::Projectile;
use crate::props::Prop;
use crate::render::{CameraParams, LightParams};
use crate::scene::{SceneGraph, Shape, Transform};
use crate::zombie::{Zombie, ZOMBIE_HALF_EXTENTS};

const GROUND_COLOR: Vec3 = Vec3::new(0.3, 0.55, 0.25);
const SPAWN_ATTEMPTS: usize = 8;
const EDGE_MARGIN: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    Playing,
    GameOver,
}

/// Serializable summary of the running game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub score: u32,
    pub kills: u32,
    pub cookies_eaten: u32,
    pub health: f32,
    pub max_health: f32,
    pub zombies: usize,
    pub cookies: usize,
    pub projectiles: usize,
    pub cat_position: Vec3,
    pub cat_color: Vec3,
    pub round_time: f32,
}

/// Fires every `interval` seconds of accumulated time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpawnTimer {
    interval: f32,
    elapsed: f32,
}

impl SpawnTimer {
    fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Owns the world and runs the per-frame update loop.
pub struct Game {
    config: GameConfig,
    bindings: Bindings,
    scene: SceneGraph,
    camera: CameraController,
    light: LightParams,
    spawn: Vec3,
    cat: Cat,
    props: Vec<Prop>,
    zombies: Vec<Zombie>,
    cookies: Vec<Cookie>,
    projectiles: Vec<Projectile>,
    phase: Phase,
    score: u32,
    kills: u32,
    cookies_eaten: u32,
    round_time: f32,
    zombie_timer: SpawnTimer,
    cookie_timer: SpawnTimer,
    next_entity_id: u32,
    rng: StdRng,
    events: Vec<NetEvent>,
    move_throttle: MoveThrottle,
    start_was_down: bool,
}

impl Game {
    /// Builds the scene for `level`: ground, props, forest, cat and camera.
    pub fn new(level: &Level) -> Result<Self> {
        let config = level.config.clone();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut scene = SceneGraph::new();

        let arena = config.arena_size * 2.0;
        scene.add(
            "ground",
            Shape::Plane,
            GROUND_COLOR,
            Transform::IDENTITY.with_scale(Vec3::new(arena, 1.0, arena)),
        );

        let mut specs = level.props.clone();
        specs.extend(level.forest_props(&mut rng));
        let props = specs
            .iter()
            .map(|spec| {
                Prop::spawn(&mut scene, spec).with_context(|| format!("failed to build {}", spec.name))
            })
            .collect::<Result<Vec<_>>>()?;

        let cat = Cat::spawn(&mut scene, level.spawn, DEFAULT_FUR, &config)
            .context("failed to build the cat")?;
        let mut camera = CameraController::new(&config);
        camera.follow(level.spawn);

        info!(
            "level {:?} ready: {} props, {} scene nodes",
            level.name,
            props.len(),
            scene.len()
        );

        let mut game = Self {
            bindings: level.bindings.clone(),
            scene,
            camera,
            light: LightParams::default(),
            spawn: level.spawn,
            cat,
            props,
            zombies: Vec::new(),
            cookies: Vec::new(),
            projectiles: Vec::new(),
            phase: Phase::Lobby,
            score: 0,
            kills: 0,
            cookies_eaten: 0,
            round_time: 0.0,
            zombie_timer: SpawnTimer::new(config.zombie_spawn_interval),
            cookie_timer: SpawnTimer::new(config.cookie_spawn_interval),
            next_entity_id: 1,
            rng,
            events: Vec::new(),
            move_throttle: MoveThrottle::new(config.move_send_interval),
            start_was_down: false,
            config,
        };
        game.sync_scene();
        Ok(game)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_params(&self, aspect: f32) -> CameraParams {
        self.camera.params(aspect)
    }

    pub fn light(&self) -> LightParams {
        self.light
    }

    pub fn cat(&self) -> &Cat {
        &self.cat
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn zombies(&self) -> &[Zombie] {
        &self.zombies
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Returns and clears the queued multiplayer events.
    pub fn drain_events(&mut self) -> Vec<NetEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            score: self.score,
            kills: self.kills,
            cookies_eaten: self.cookies_eaten,
            health: self.cat.health.current,
            max_health: self.cat.health.max,
            zombies: self.zombies.len(),
            cookies: self.cookies.len(),
            projectiles: self.projectiles.len(),
            cat_position: self.cat.position(),
            cat_color: self.cat.color,
            round_time: self.round_time,
        }
    }

    /// One-line HUD text.
    pub fn status_line(&self) -> String {
        match self.phase {
            Phase::Lobby => {
                "Lobby | step on a pad to pick a colour, press Enter to start".to_string()
            }
            Phase::Playing => format!(
                "Score {} | Health {:.0}/{:.0} | Zombies {} | Cookies {}",
                self.score,
                self.cat.health.current,
                self.cat.health.max,
                self.zombies.len(),
                self.cookies.len()
            ),
            Phase::GameOver => format!(
                "Game over | Score {} | press Enter to return to the lobby",
                self.score
            ),
        }
    }

    /// Begins a round from the lobby.
    pub fn start_round(&mut self) {
        if self.phase != Phase::Lobby {
            return;
        }
        self.phase = Phase::Playing;
        self.score = 0;
        self.kills = 0;
        self.cookies_eaten = 0;
        self.round_time = 0.0;
        self.zombie_timer.reset();
        self.cookie_timer.reset();
        self.move_throttle.reset();
        self.events.push(NetEvent::PlayerJoined {
            color: self.cat.color,
        });
        info!("round started");
    }

    /// Clears the round and returns to the lobby.
    pub fn reset(&mut self) {
        for zombie in self.zombies.drain(..) {
            zombie.despawn(&mut self.scene);
        }
        for cookie in self.cookies.drain(..) {
            cookie.despawn(&mut self.scene);
        }
        for projectile in self.projectiles.drain(..) {
            projectile.despawn(&mut self.scene);
        }
        self.cat.respawn(self.spawn);
        self.phase = Phase::Lobby;
        self.round_time = 0.0;
        self.zombie_timer.reset();
        self.cookie_timer.reset();
        self.move_throttle.reset();
        self.sync_scene();
        info!("back in the lobby");
    }

    /// Advances the game by `dt` seconds.
    pub fn update(&mut self, dt: f32, input: &InputState) -> Result<()> {
        let dt = dt.clamp(0.0, self.config.max_frame_time);

        let start_down = self.bindings.is_active(input, Action::Start);
        let start_pressed = start_down && !self.start_was_down;
        self.start_was_down = start_down;

        let look = input.take_mouse_delta();
        let yaw_axis = self.axis(input, Action::LookRight, Action::LookLeft);
        let pitch_axis = self.axis(input, Action::LookUp, Action::LookDown);
        self.camera.rotate(look.x, look.y);
        self.camera.rotate_by_keys(yaw_axis, pitch_axis, dt);

        match self.phase {
            Phase::Lobby => {
                self.update_cat(dt, input);
                if start_pressed {
                    self.start_round();
                }
            }
            Phase::Playing => {
                self.round_time += dt;
                self.update_cat(dt, input);
                if self.bindings.is_active(input, Action::Shoot) {
                    self.fire();
                }
                self.update_projectiles(dt);
                self.update_zombies(dt);
                self.update_cookies(dt);
                self.run_spawners(dt)?;
                if let Some(event) =
                    self.move_throttle
                        .poll(dt, self.cat.position(), self.cat.yaw)
                {
                    self.events.push(event);
                }
                if self.cat.health.is_dead() {
                    self.phase = Phase::GameOver;
                    self.events.push(NetEvent::PlayerDied { score: self.score });
                    info!(
                        "the cat was caught after {:.1}s with {} points",
                        self.round_time, self.score
                    );
                }
            }
            Phase::GameOver => {
                if start_pressed {
                    self.reset();
                }
            }
        }

        self.sync_scene();
        Ok(())
    }

    /// `+1` when `positive` is held, `-1` for `negative`, `0` for both or neither.
    fn axis(&self, input: &InputState, negative: Action, positive: Action) -> f32 {
        let value = |action| {
            if self.bindings.is_active(input, action) {
                1.0
            } else {
                0.0
            }
        };
        value(positive) - value(negative)
    }

    fn update_cat(&mut self, dt: f32, input: &InputState) {
        let forward = self.axis(input, Action::MoveBack, Action::MoveForward);
        let strafe = self.axis(input, Action::MoveLeft, Action::MoveRight);
        let intent = MoveIntent {
            direction: self.camera.forward_xz() * forward + self.camera.right_xz() * strafe,
            sprint: self.bindings.is_active(input, Action::Sprint),
            jump: self.bindings.is_active(input, Action::Jump),
        };
        let outcome = self.cat.update(dt, intent, &self.props, &self.config);
        if outcome.bounced {
            debug!("boing");
        }

        if self.phase == Phase::Lobby {
            if let Some(pad) = outcome.pads.first().map(|index| &self.props[*index]) {
                if pad.color != self.cat.color {
                    info!("cat picked colour from {}", pad.name);
                    let color = pad.color;
                    self.cat.set_color(&mut self.scene, color);
                }
            }
        }
    }

    fn fire(&mut self) {
        if !self.cat.try_fire(self.config.fire_cooldown) {
            return;
        }
        self.cat.yaw = self.camera.yaw;
        let origin = self.cat.muzzle();
        let direction = self.cat.forward();
        self.projectiles.push(Projectile::spawn(
            &mut self.scene,
            origin,
            direction,
            self.config.projectile_speed,
            self.config.projectile_lifetime,
        ));
        self.events.push(NetEvent::PlayerShot { origin, direction });
    }

    fn update_projectiles(&mut self, dt: f32) {
        let mut index = 0;
        while index < self.projectiles.len() {
            self.projectiles[index].update(dt);
            let bounds = self.projectiles[index].bounds();

            let hit_prop = self
                .props
                .iter()
                .any(|prop| prop.is_solid() && prop.bounds.intersects(&bounds));
            let hit_zombie = if hit_prop {
                None
            } else {
                self.zombies
                    .iter()
                    .position(|zombie| zombie.bounds().intersects(&bounds))
            };

            if let Some(target) = hit_zombie {
                if self.zombies[target].take_damage(self.config.projectile_damage) {
                    let zombie = self.zombies.remove(target);
                    zombie.despawn(&mut self.scene);
                    self.kills += 1;
                    self.score += self.config.zombie_score;
                    debug!("zombie {} down, score {}", zombie.id, self.score);
                    self.events.push(NetEvent::ZombieKilled {
                        zombie: zombie.id,
                        score: self.score,
                    });
                }
            }

            if hit_prop || hit_zombie.is_some() || self.projectiles[index].expired() {
                let projectile = self.projectiles.remove(index);
                projectile.despawn(&mut self.scene);
            } else {
                index += 1;
            }
        }
    }

    fn update_zombies(&mut self, dt: f32) {
        let cat_bounds = self.cat.bounds();
        let mut damage = 0.0;
        for zombie in &mut self.zombies {
            damage += zombie.update(dt, &cat_bounds, &self.props, &self.config, &mut self.rng);
        }
        if damage > 0.0 {
            self.cat.health.damage(damage);
            debug!("cat took {damage} damage, {} left", self.cat.health.current);
        }
    }

    fn update_cookies(&mut self, dt: f32) {
        let cat_bounds = self.cat.bounds();
        let mut index = 0;
        while index < self.cookies.len() {
            self.cookies[index].update(dt);
            if !self.cookies[index].bounds().intersects(&cat_bounds) {
                index += 1;
                continue;
            }
            let cookie = self.cookies.remove(index);
            cookie.despawn(&mut self.scene);
            self.cat.health.heal(self.config.cookie_heal);
            self.cookies_eaten += 1;
            self.score += self.config.cookie_score;
            debug!("cookie {} eaten, health {}", cookie.id, self.cat.health.current);
            self.events.push(NetEvent::CookieCollected {
                cookie: cookie.id,
                health: self.cat.health.current,
            });
        }
    }

    fn run_spawners(&mut self, dt: f32) -> Result<()> {
        if self.zombie_timer.tick(dt) && self.zombies.len() < self.config.max_zombies {
            let position = self.zombie_spawn_point();
            self.spawn_zombie_at(position)?;
        }
        if self.cookie_timer.tick(dt) && self.cookies.len() < self.config.max_cookies {
            match self.cookie_spawn_point() {
                Some(position) => {
                    self.spawn_cookie_at(position)?;
                }
                None => debug!("no free spot for a cookie, skipping"),
            }
        }
        Ok(())
    }

    /// Random point on the arena edge, preferring points away from the cat.
    fn zombie_spawn_point(&mut self) -> Vec3 {
        let limit = (self.config.arena_size - EDGE_MARGIN).max(1.0);
        let mut best = Vec3::new(limit, 0.0, limit);
        let mut best_distance = f32::MIN;
        for _ in 0..SPAWN_ATTEMPTS {
            let along = self.rng.gen_range(-limit..limit);
            let candidate = match self.rng.gen_range(0..4) {
                0 => Vec3::new(along, 0.0, -limit),
                1 => Vec3::new(along, 0.0, limit),
                2 => Vec3::new(-limit, 0.0, along),
                _ => Vec3::new(limit, 0.0, along),
            };
            let distance = candidate.distance(self.cat.position() * Vec3::new(1.0, 0.0, 1.0));
            if distance > best_distance {
                best = candidate;
                best_distance = distance;
            }
            if distance >= self.config.min_spawn_distance {
                break;
            }
        }
        push_out_of_solids(best, ZOMBIE_HALF_EXTENTS, &self.props)
    }

    /// Random point inside the arena that is not inside a prop, if one turns up.
    fn cookie_spawn_point(&mut self) -> Option<Vec3> {
        let limit = (self.config.arena_size - EDGE_MARGIN * 2.0).max(1.0);
        for _ in 0..SPAWN_ATTEMPTS {
            let candidate = Vec3::new(
                self.rng.gen_range(-limit..limit),
                0.0,
                self.rng.gen_range(-limit..limit),
            );
            let footprint = bounds_at(candidate, CAT_HALF_EXTENTS);
            let blocked = self
                .props
                .iter()
                .any(|prop| (prop.is_solid() || prop.is_walkable()) && prop.bounds.intersects(&footprint));
            if !blocked {
                return Some(candidate);
            }
        }
        None
    }

    /// Spawns a zombie at `position` and returns its id.
    pub fn spawn_zombie_at(&mut self, position: Vec3) -> Result<u32> {
        let id = self.next_id();
        let zombie = Zombie::spawn(&mut self.scene, id, position, &self.config)
            .context("failed to build zombie")?;
        zombie.sync(&mut self.scene, self.camera.yaw);
        debug!("zombie {id} spawned at {position}");
        self.zombies.push(zombie);
        Ok(id)
    }

    /// Spawns a cookie at `position` and returns its id.
    pub fn spawn_cookie_at(&mut self, position: Vec3) -> Result<u32> {
        let id = self.next_id();
        let cookie =
            Cookie::spawn(&mut self.scene, id, position).context("failed to build cookie")?;
        debug!("cookie {id} baked at {position}");
        self.cookies.push(cookie);
        Ok(id)
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    fn sync_scene(&mut self) {
        self.camera.follow(self.cat.position());
        let yaw = self.camera.yaw;
        self.cat.sync(&mut self.scene, yaw);
        for zombie in &self.zombies {
            zombie.sync(&mut self.scene, yaw);
        }
        for cookie in &self.cookies {
            cookie.sync(&mut self.scene);
        }
        for projectile in &self.projectiles {
            projectile.sync(&mut self.scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, MouseButton, NamedKey};

    const ENTER: KeyCode = KeyCode::Named(NamedKey::Enter);
    const FRAME: f32 = 1.0 / 60.0;

    fn empty_level(settings: &str) -> Level {
        Level::from_xml(&format!(
            "<level><settings>{settings}</settings><spawn>0 0 0</spawn></level>"
        ))
        .unwrap()
    }

    fn started(level: &Level, input: &InputState) -> Game {
        let mut game = Game::new(level).unwrap();
        input.set_key_down(ENTER);
        game.update(FRAME, input).unwrap();
        input.set_key_up(ENTER);
        assert_eq!(game.phase(), Phase::Playing);
        game
    }

    fn run(game: &mut Game, input: &InputState, frames: usize) {
        for _ in 0..frames {
            game.update(FRAME, input).unwrap();
        }
    }

    #[test]
    fn start_is_edge_triggered() {
        let level = empty_level("");
        let input = InputState::new();
        let mut game = started(&level, &input);
        assert_eq!(
            game.drain_events(),
            vec![NetEvent::PlayerJoined { color: DEFAULT_FUR }]
        );
        assert!(game.drain_events().is_empty());
        input.set_key_down(ENTER);
        run(&mut game, &input, 5);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn color_pad_recolors_cat_in_lobby() {
        let level = Level::from_xml(
            "<level><spawn>0 0 0</spawn><prop><name>pad</name><kind>color_selector</kind>\
             <position>0 0 0</position><color>0 0 255</color></prop></level>",
        )
        .unwrap();
        let input = InputState::new();
        let mut game = Game::new(&level).unwrap();
        game.update(FRAME, &input).unwrap();
        assert_eq!(game.cat().color, Vec3::new(0.0, 0.0, 1.0));
        let body = game.scene().find_by_name("cat-body").unwrap();
        assert_eq!(game.scene().get(body).unwrap().color, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn shooting_kills_a_zombie() {
        let level = empty_level("");
        let input = InputState::new();
        let mut game = started(&level, &input);
        game.drain_events();
        let id = game.spawn_zombie_at(Vec3::new(0.0, 0.0, -6.0)).unwrap();

        input.set_mouse_button_down(MouseButton::LEFT);
        run(&mut game, &input, 60);

        assert!(game.zombies().is_empty());
        assert_eq!(game.score(), game.config().zombie_score);
        assert_eq!(game.snapshot().kills, 1);
        assert!(game.scene().find_by_name(&format!("zombie-{id}")).is_none());
        let events = game.drain_events();
        assert!(events.iter().any(|event| event.name() == "playerShot"));
        assert!(events
            .iter()
            .any(|event| matches!(event, NetEvent::ZombieKilled { zombie, .. } if *zombie == id)));
    }

    #[test]
    fn walking_into_a_cookie_collects_it() {
        let level = empty_level("");
        let input = InputState::new();
        let mut game = started(&level, &input);
        game.spawn_cookie_at(Vec3::new(0.0, 0.0, -3.0)).unwrap();
        input.set_key_down(KeyCode::Character('W'));
        run(&mut game, &input, 30);
        assert!(game.cookies().is_empty());
        assert_eq!(game.score(), game.config().cookie_score);
        assert_eq!(game.snapshot().cookies_eaten, 1);
        assert!(game
            .drain_events()
            .iter()
            .any(|event| event.name() == "cookieCollected"));
    }

    #[test]
    fn zombie_contact_ends_the_round_and_start_resets() {
        let level = empty_level("<zombie_damage>100</zombie_damage>");
        let input = InputState::new();
        let mut game = started(&level, &input);
        game.spawn_zombie_at(Vec3::new(0.6, 0.0, 0.0)).unwrap();
        game.spawn_cookie_at(Vec3::new(20.0, 0.0, 20.0)).unwrap();
        game.update(FRAME, &input).unwrap();
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(game
            .drain_events()
            .contains(&NetEvent::PlayerDied { score: 0 }));

        let frozen = game.zombies()[0].position;
        run(&mut game, &input, 10);
        assert_eq!(game.zombies()[0].position, frozen);

        input.set_key_down(ENTER);
        game.update(FRAME, &input).unwrap();
        assert_eq!(game.phase(), Phase::Lobby);
        assert!(game.zombies().is_empty());
        assert!(game.cookies().is_empty());
        assert!(game.scene().find_by_name("zombie-1").is_none());
        assert_eq!(game.cat().health.fraction(), 1.0);

        run(&mut game, &input, 3);
        assert_eq!(game.phase(), Phase::Lobby);
    }

    #[test]
    fn spawners_respect_limits_and_distance() {
        let level = empty_level(
            "<zombie_spawn_interval>0.5</zombie_spawn_interval>\
             <max_zombies>3</max_zombies>\
             <zombie_speed>0</zombie_speed>\
             <cookie_spawn_interval>0.5</cookie_spawn_interval>\
             <max_cookies>2</max_cookies>",
        );
        let input = InputState::new();
        let mut game = started(&level, &input);
        run(&mut game, &input, 300);
        assert_eq!(game.zombies().len(), 3);
        let cat = game.cat().position();
        for zombie in game.zombies() {
            assert!(zombie.position.distance(cat) >= game.config().min_spawn_distance);
            assert!(zombie.position.x.abs() <= game.config().arena_size);
            assert!(zombie.position.z.abs() <= game.config().arena_size);
        }
        assert!((1..=2).contains(&game.cookies().len()));
    }

    #[test]
    fn cookies_skip_spawning_when_props_cover_the_arena() {
        let level = Level::from_xml(
            "<level><settings>\
                <arena_size>4</arena_size>\
                <cookie_spawn_interval>0.1</cookie_spawn_interval>\
                <zombie_spawn_interval>1000</zombie_spawn_interval>\
             </settings>\
             <spawn>0 3 0</spawn>\
             <prop><name>deck</name><kind>walkway</kind>\
                <position>0 0 0</position><size>12 1 12</size></prop></level>",
        )
        .unwrap();
        let input = InputState::new();
        let mut game = started(&level, &input);
        run(&mut game, &input, 60);
        assert!(game.cookies().is_empty());
    }

    #[test]
    fn tiny_arenas_are_rejected_and_never_panic() {
        assert!(Level::from_xml(
            "<level><settings><arena_size>0.3</arena_size></settings></level>"
        )
        .is_err());

        let mut level = empty_level(
            "<zombie_spawn_interval>0.1</zombie_spawn_interval>\
             <cookie_spawn_interval>0.1</cookie_spawn_interval>",
        );
        level.config.arena_size = 0.3;
        let input = InputState::new();
        let mut game = started(&level, &input);
        input.set_key_down(KeyCode::Character('D'));
        run(&mut game, &input, 60);
        assert!(game.cat().position().x.abs() <= 0.3);
    }

    #[test]
    fn nothing_spawns_in_the_lobby() {
        let level = empty_level("<zombie_spawn_interval>0.1</zombie_spawn_interval>");
        let input = InputState::new();
        let mut game = Game::new(&level).unwrap();
        run(&mut game, &input, 120);
        assert_eq!(game.phase(), Phase::Lobby);
        assert!(game.zombies().is_empty());
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn long_frames_are_clamped() {
        let level = empty_level("");
        let input = InputState::new();
        let mut game = Game::new(&level).unwrap();
        input.set_key_down(KeyCode::Character('W'));
        game.update(5.0, &input).unwrap();
        let max_step = game.config().cat_speed * game.config().max_frame_time;
        assert!(game.cat().position().length() <= max_step + 1e-4);
    }

    #[test]
    fn camera_follows_the_cat() {
        let level = empty_level("");
        let input = InputState::new();
        let mut game = Game::new(&level).unwrap();
        input.set_key_down(KeyCode::Character('D'));
        run(&mut game, &input, 30);
        let cat = game.cat().position();
        assert!(cat.x > 1.0);
        let target = game.camera().target();
        assert!((target.x - cat.x).abs() < 1e-4);
        assert!(game.status_line().starts_with("Lobby"));
    }

    #[test]
    fn builtin_level_builds() {
        let level = Level::builtin().unwrap();
        let game = Game::new(&level).unwrap();
        assert!(game.props().len() > level.props.len());
        assert!(!game.scene().draw_list().is_empty());
    }
}
