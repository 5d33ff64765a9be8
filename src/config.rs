use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Tunable game settings. Level files override individual fields by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Half the side length of the square play area.
    pub arena_size: f32,
    pub gravity: f32,
    pub max_frame_time: f32,
    pub seed: u64,

    pub cat_speed: f32,
    pub sprint_multiplier: f32,
    pub jump_speed: f32,
    pub trampoline_bounce: f32,
    pub cat_health: f32,
    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_damage: f32,

    pub zombie_speed: f32,
    pub zombie_health: f32,
    pub zombie_damage: f32,
    pub zombie_attack_cooldown: f32,
    pub zombie_aggro_radius: f32,
    pub zombie_spawn_interval: f32,
    pub max_zombies: usize,
    pub min_spawn_distance: f32,

    pub cookie_spawn_interval: f32,
    pub max_cookies: usize,
    pub cookie_heal: f32,

    pub zombie_score: u32,
    pub cookie_score: u32,

    pub camera_distance: f32,
    pub camera_height: f32,
    pub camera_min_pitch: f32,
    pub camera_max_pitch: f32,
    pub camera_sensitivity: f32,
    pub camera_fov: f32,

    pub move_send_interval: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_size: 40.0,
            gravity: 25.0,
            max_frame_time: 0.1,
            seed: 0x00ca_7c00c1e,

            cat_speed: 8.0,
            sprint_multiplier: 1.75,
            jump_speed: 9.0,
            trampoline_bounce: 18.0,
            cat_health: 100.0,
            fire_cooldown: 0.25,
            projectile_speed: 30.0,
            projectile_lifetime: 1.5,
            projectile_damage: 25.0,

            zombie_speed: 3.0,
            zombie_health: 50.0,
            zombie_damage: 10.0,
            zombie_attack_cooldown: 1.0,
            zombie_aggro_radius: 18.0,
            zombie_spawn_interval: 3.0,
            max_zombies: 12,
            min_spawn_distance: 15.0,

            cookie_spawn_interval: 5.0,
            max_cookies: 5,
            cookie_heal: 15.0,

            zombie_score: 10,
            cookie_score: 5,

            camera_distance: 8.0,
            camera_height: 1.5,
            camera_min_pitch: 0.05,
            camera_max_pitch: 1.3,
            camera_sensitivity: 0.003,
            camera_fov: 60.0,

            move_send_interval: 0.1,
        }
    }
}

/// Smallest arena that still leaves room for spawning inside the fence.
pub const MIN_ARENA_SIZE: f32 = 4.0;

impl GameConfig {
    /// Overrides a single setting by its field name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "arena_size" => {
                let size = parse_positive(name, value)?;
                if size < MIN_ARENA_SIZE {
                    return Err(anyhow!("<{name}> must be at least {MIN_ARENA_SIZE}"));
                }
                self.arena_size = size;
            }
            "gravity" => self.gravity = parse_positive(name, value)?,
            "max_frame_time" => self.max_frame_time = parse_positive(name, value)?,
            "seed" => self.seed = parse_integer(name, value)?,
            "cat_speed" => self.cat_speed = parse_positive(name, value)?,
            "sprint_multiplier" => self.sprint_multiplier = parse_positive(name, value)?,
            "jump_speed" => self.jump_speed = parse_positive(name, value)?,
            "trampoline_bounce" => self.trampoline_bounce = parse_positive(name, value)?,
            "cat_health" => self.cat_health = parse_positive(name, value)?,
            "fire_cooldown" => self.fire_cooldown = parse_non_negative(name, value)?,
            "projectile_speed" => self.projectile_speed = parse_positive(name, value)?,
            "projectile_lifetime" => self.projectile_lifetime = parse_positive(name, value)?,
            "projectile_damage" => self.projectile_damage = parse_positive(name, value)?,
            "zombie_speed" => self.zombie_speed = parse_non_negative(name, value)?,
            "zombie_health" => self.zombie_health = parse_positive(name, value)?,
            "zombie_damage" => self.zombie_damage = parse_non_negative(name, value)?,
            "zombie_attack_cooldown" => {
                self.zombie_attack_cooldown = parse_non_negative(name, value)?
            }
            "zombie_aggro_radius" => self.zombie_aggro_radius = parse_non_negative(name, value)?,
            "zombie_spawn_interval" => {
                self.zombie_spawn_interval = parse_positive(name, value)?
            }
            "max_zombies" => self.max_zombies = parse_integer(name, value)?,
            "min_spawn_distance" => self.min_spawn_distance = parse_non_negative(name, value)?,
            "cookie_spawn_interval" => {
                self.cookie_spawn_interval = parse_positive(name, value)?
            }
            "max_cookies" => self.max_cookies = parse_integer(name, value)?,
            "cookie_heal" => self.cookie_heal = parse_non_negative(name, value)?,
            "zombie_score" => self.zombie_score = parse_integer(name, value)?,
            "cookie_score" => self.cookie_score = parse_integer(name, value)?,
            "camera_distance" => self.camera_distance = parse_positive(name, value)?,
            "camera_height" => self.camera_height = parse_non_negative(name, value)?,
            "camera_min_pitch" => self.camera_min_pitch = parse_f32(name, value)?,
            "camera_max_pitch" => self.camera_max_pitch = parse_f32(name, value)?,
            "camera_sensitivity" => self.camera_sensitivity = parse_positive(name, value)?,
            "camera_fov" => self.camera_fov = parse_positive(name, value)?,
            "move_send_interval" => self.move_send_interval = parse_non_negative(name, value)?,
            other => return Err(anyhow!("unknown setting <{other}>")),
        }
        Ok(())
    }

    /// Checks rules spanning several settings. Run once all overrides are applied.
    pub fn validate(&self) -> Result<()> {
        if self.camera_min_pitch > self.camera_max_pitch {
            return Err(anyhow!(
                "camera_min_pitch ({}) exceeds camera_max_pitch ({})",
                self.camera_min_pitch,
                self.camera_max_pitch
            ));
        }
        Ok(())
    }
}

fn parse_f32(name: &str, value: &str) -> Result<f32> {
    let parsed = value
        .trim()
        .parse::<f32>()
        .map_err(|err| anyhow!("failed to parse <{name}> as a number: {err}"))?;
    if !parsed.is_finite() {
        return Err(anyhow!("<{name}> must be finite"));
    }
    Ok(parsed)
}

fn parse_non_negative(name: &str, value: &str) -> Result<f32> {
    let parsed = parse_f32(name, value)?;
    if parsed < 0.0 {
        return Err(anyhow!("<{name}> must not be negative"));
    }
    Ok(parsed)
}

fn parse_positive(name: &str, value: &str) -> Result<f32> {
    let parsed = parse_f32(name, value)?;
    if parsed <= 0.0 {
        return Err(anyhow!("<{name}> must be greater than zero"));
    }
    Ok(parsed)
}

fn parse_integer<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| anyhow!("failed to parse <{name}> as an integer: {err}"))
}
