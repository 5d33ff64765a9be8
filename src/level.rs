use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use rand::Rng;
use roxmltree::{Document, Node};

use crate::config::GameConfig;
use crate::input::Bindings;
use crate::props::{PropKind, PropSpec};

const BUILTIN_LEVEL: &str = include_str!("../assets/level.xml");

/// Margin kept free between scattered trees and the arena fence.
const FOREST_EDGE_MARGIN: f32 = 2.0;

/// Upper bound on the `count` attribute of `<forest>`.
pub const MAX_FOREST_TREES: usize = 500;

/// Placement tries per requested tree before the forest gives up.
const FOREST_ATTEMPTS_PER_TREE: usize = 20;

/// Level layout: settings, controls, spawn point, and static props.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub name: String,
    pub config: GameConfig,
    pub bindings: Bindings,
    pub spawn: Vec3,
    pub props: Vec<PropSpec>,
    pub forest: Option<ForestSpec>,
}

/// Randomly scattered trees around the lobby.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestSpec {
    pub count: usize,
    /// Trees keep at least this distance from the spawn point.
    pub inner_radius: f32,
}

impl Level {
    /// The level shipped with the game.
    pub fn builtin() -> Result<Self> {
        Self::from_xml(BUILTIN_LEVEL).context("built-in level is invalid")
    }

    /// Parses a level file.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid level XML")?;
        let root = document.root_element();
        if !root.has_tag_name("level") {
            return Err(anyhow!(
                "expected <level> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let mut config = GameConfig::default();
        if let Some(settings) = child_element(&root, "settings") {
            for setting in settings.children().filter(Node::is_element) {
                let name = setting.tag_name().name();
                let value = setting.text().unwrap_or_default();
                config
                    .set(name, value)
                    .with_context(|| format!("invalid setting <{name}>"))?;
            }
        }
        config.validate().context("invalid settings")?;

        let mut bindings = Bindings::default();
        if let Some(controls) = child_element(&root, "controls") {
            for control in controls.children().filter(Node::is_element) {
                let tag = control.tag_name().name();
                bindings
                    .rebind_tag(tag, control.text().unwrap_or_default())
                    .with_context(|| format!("invalid control <{tag}>"))?;
            }
        }

        let spawn = parse_vec3(optional_text(&root, "spawn"), Vec3::ZERO)?;

        let forest = match child_element(&root, "forest") {
            Some(node) => Some(parse_forest(&node).context("invalid <forest>")?),
            None => None,
        };

        let mut props = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("prop")) {
            props.push(parse_prop(&node)?);
        }

        Ok(Self {
            name: root.attribute("name").unwrap_or("Untitled").to_string(),
            config,
            bindings,
            spawn,
            props,
            forest,
        })
    }

    /// Scatters the forest trees. The result only depends on the RNG state.
    pub fn forest_props<R: Rng>(&self, rng: &mut R) -> Vec<PropSpec> {
        let Some(forest) = self.forest else {
            return Vec::new();
        };
        let limit = self.config.arena_size - FOREST_EDGE_MARGIN;
        if limit <= forest.inner_radius.max(0.0) {
            return Vec::new();
        }

        let count = forest.count.min(MAX_FOREST_TREES);
        let mut trees: Vec<PropSpec> = Vec::new();
        let mut attempts = 0;
        while trees.len() < count && attempts < count.saturating_mul(FOREST_ATTEMPTS_PER_TREE) {
            attempts += 1;
            let position = Vec3::new(
                rng.gen_range(-limit..limit),
                0.0,
                rng.gen_range(-limit..limit),
            );
            if position.distance(self.spawn) < forest.inner_radius {
                continue;
            }
            let crowded = self
                .props
                .iter()
                .chain(trees.iter())
                .any(|other| footprint_radius(other) + 1.5 > other.position.distance(position));
            if crowded {
                continue;
            }
            let scale = rng.gen_range(0.8..1.3);
            let mut tree = PropSpec::new(
                format!("tree-{}", trees.len() + 1),
                PropKind::Tree,
                position,
            );
            tree.size *= scale;
            tree.rotation = rng.gen_range(0.0..360.0);
            tree.color *= rng.gen_range(0.85..1.1);
            trees.push(tree);
        }
        trees
    }
}

fn parse_forest(node: &Node<'_, '_>) -> Result<ForestSpec> {
    let count = parse_attribute(node, "count", 0usize)?;
    if count > MAX_FOREST_TREES {
        return Err(anyhow!("count {count} exceeds the limit of {MAX_FOREST_TREES} trees"));
    }
    let inner_radius = parse_attribute(node, "inner_radius", 12.0f32)?;
    if !inner_radius.is_finite() || inner_radius < 0.0 {
        return Err(anyhow!("inner_radius must be a non-negative number, got {inner_radius}"));
    }
    Ok(ForestSpec {
        count,
        inner_radius,
    })
}

fn footprint_radius(spec: &PropSpec) -> f32 {
    spec.size.x.max(spec.size.z) * 0.5
}

fn parse_prop(node: &Node<'_, '_>) -> Result<PropSpec> {
    let name = required_text(node, "name")?;
    let kind = PropKind::from_name(&required_text(node, "kind")?)
        .with_context(|| format!("prop {name}"))?;
    let mut spec = PropSpec::new(name, kind, Vec3::ZERO);
    spec.position = parse_vec3(optional_text(node, "position"), spec.position)
        .with_context(|| format!("prop {} has an invalid position", spec.name))?;
    spec.size = parse_vec3(optional_text(node, "size"), spec.size)
        .with_context(|| format!("prop {} has an invalid size", spec.name))?;
    if spec.size.min_element() <= 0.0 {
        return Err(anyhow!("prop {} must have a positive size", spec.name));
    }
    spec.rotation = parse_f32(optional_text(node, "rotation"), spec.rotation)?;
    spec.color = parse_color(optional_text(node, "color"), spec.color)?;
    Ok(spec)
}

fn child_element<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_attribute<T: std::str::FromStr>(node: &Node<'_, '_>, name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match node.attribute(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|err| anyhow!("failed to parse attribute {name}: {err}")),
        None => Ok(default),
    }
}

fn parse_components(value: &str, what: &str) -> Result<[f32; 3]> {
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid {what} component {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if let Some(bad) = numbers.iter().find(|number| !number.is_finite()) {
        return Err(anyhow!("{what} component {bad} is not finite"));
    }
    match numbers.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(anyhow!("{what} needs exactly 3 components")),
    }
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec3::from_array(parse_components(&value, "vector")?))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let [r, g, b] = parse_components(&value, "color")?;
    Ok(Vec3::new(r, g, b) / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    let Some(value) = value else {
        return Ok(default);
    };
    let number = value
        .parse::<f32>()
        .map_err(|err| anyhow!("failed to parse float: {err}"))?;
    if !number.is_finite() {
        return Err(anyhow!("{value:?} is not a finite number"));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::input::{Action, InputName, KeyCode};

    static BUILTIN: Lazy<Level> = Lazy::new(|| Level::builtin().unwrap());

    const SAMPLE: &str = r#"
    <level name="Test Yard">
        <settings>
            <max_zombies>2</max_zombies>
            <zombie_speed>1.5</zombie_speed>
        </settings>
        <controls>
            <jump>J</jump>
        </controls>
        <spawn>1 0 2</spawn>
        <forest count="5" inner_radius="8"/>
        <prop>
            <name>Sign</name>
            <kind>billboard</kind>
            <position>0 0 -6</position>
            <color>255 128 0</color>
        </prop>
        <prop>
            <name>Pad</name>
            <kind>color_selector</kind>
            <size>2 0.1 2</size>
        </prop>
    </level>
    "#;

    #[test]
    fn parse_level_populates_everything() {
        let level = Level::from_xml(SAMPLE).unwrap();
        assert_eq!(level.name, "Test Yard");
        assert_eq!(level.config.max_zombies, 2);
        assert_eq!(level.config.zombie_speed, 1.5);
        assert_eq!(
            level.bindings.inputs(Action::Jump),
            &[InputName::Key(KeyCode::Character('J'))]
        );
        assert_eq!(level.spawn, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(
            level.forest,
            Some(ForestSpec {
                count: 5,
                inner_radius: 8.0
            })
        );
        assert_eq!(level.props.len(), 2);
        let sign = &level.props[0];
        assert_eq!(sign.kind, PropKind::Billboard);
        assert_eq!(sign.color, Vec3::new(1.0, 128.0 / 255.0, 0.0));
        assert_eq!(sign.size, PropKind::Billboard.default_size());
    }

    #[test]
    fn missing_name_is_an_error() {
        let bad = "<level><prop><kind>tree</kind></prop></level>";
        assert!(Level::from_xml(bad).is_err());
    }

    #[test]
    fn bad_settings_and_controls_are_errors() {
        assert!(Level::from_xml("<level><settings><warp>1</warp></settings></level>").is_err());
        assert!(Level::from_xml("<level><controls><jump>Nope</jump></controls></level>").is_err());
        assert!(Level::from_xml("<world/>").is_err());
        assert!(Level::from_xml("<level><spawn>1 2</spawn></level>").is_err());
    }

    #[test]
    fn pitch_settings_are_accepted_in_either_order() {
        let raise_min_first = "<level><settings>\
            <camera_min_pitch>1.4</camera_min_pitch>\
            <camera_max_pitch>1.5</camera_max_pitch>\
            </settings></level>";
        let raise_max_first = "<level><settings>\
            <camera_max_pitch>1.5</camera_max_pitch>\
            <camera_min_pitch>1.4</camera_min_pitch>\
            </settings></level>";
        for xml in [raise_min_first, raise_max_first] {
            let level = Level::from_xml(xml).unwrap();
            assert_eq!(level.config.camera_min_pitch, 1.4);
            assert_eq!(level.config.camera_max_pitch, 1.5);
        }
        let inverted = "<level><settings>\
            <camera_min_pitch>1.2</camera_min_pitch>\
            <camera_max_pitch>0.8</camera_max_pitch>\
            </settings></level>";
        assert!(Level::from_xml(inverted).is_err());
    }

    #[test]
    fn forest_attributes_are_validated() {
        for forest in [
            r#"<forest count="18446744073709551615"/>"#,
            r#"<forest count="501"/>"#,
            r#"<forest count="5" inner_radius="-1"/>"#,
            r#"<forest count="5" inner_radius="NaN"/>"#,
            r#"<forest count="5" inner_radius="inf"/>"#,
        ] {
            let xml = format!("<level>{forest}</level>");
            assert!(Level::from_xml(&xml).is_err(), "{forest}");
        }
        let level = Level::from_xml(r#"<level><forest count="500" inner_radius="0"/></level>"#)
            .unwrap();
        assert_eq!(level.forest.map(|forest| forest.count), Some(MAX_FOREST_TREES));
    }

    #[test]
    fn forest_scattering_tolerates_out_of_range_specs() {
        let mut level = Level::from_xml(SAMPLE).unwrap();
        level.forest = Some(ForestSpec {
            count: usize::MAX,
            inner_radius: -3.0,
        });
        let trees = level.forest_props(&mut StdRng::seed_from_u64(1));
        assert!(trees.len() <= MAX_FOREST_TREES);

        level.config.arena_size = 1.0;
        assert!(level.forest_props(&mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for prop in [
            "<position>NaN 0 0</position>",
            "<position>0 inf 0</position>",
            "<size>1 -inf 1</size>",
            "<color>255 NaN 0</color>",
            "<rotation>NaN</rotation>",
            "<rotation>inf</rotation>",
        ] {
            let xml = format!("<level><prop><name>Bad</name><kind>rock</kind>{prop}</prop></level>");
            assert!(Level::from_xml(&xml).is_err(), "{prop}");
        }
        assert!(Level::from_xml("<level><spawn>0 NaN 0</spawn></level>").is_err());
    }

    #[test]
    fn forest_is_deterministic_and_keeps_the_lobby_clear() {
        let level = Level::from_xml(SAMPLE).unwrap();
        let first = level.forest_props(&mut StdRng::seed_from_u64(9));
        let second = level.forest_props(&mut StdRng::seed_from_u64(9));
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        for tree in &first {
            assert!(tree.position.distance(level.spawn) >= 8.0);
            assert!(tree.position.x.abs() <= level.config.arena_size);
        }
    }

    #[test]
    fn builtin_level_has_every_prop_kind() {
        for kind in [
            PropKind::Billboard,
            PropKind::Trampoline,
            PropKind::Walkway,
            PropKind::ColorSelector,
        ] {
            assert!(BUILTIN.props.iter().any(|prop| prop.kind == kind), "{kind:?}");
        }
        assert!(BUILTIN.forest.is_some());
    }
}
