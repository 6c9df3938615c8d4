/*!
# Static Game Data

Character property sheets, weapons, and zone layouts. These are read once
at startup from TOML files under the data root and treated as immutable
afterwards.

```text
<data_root>/characters/<character_type>.toml
<data_root>/weapons/<weapon_name>.toml
<data_root>/zones/<zone>.toml
```

Character sheets that are not on disk fall back to built-in defaults so a
zone can run with nothing but its zone file.
*/

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ecs::core::components::CharacterType;
use crate::error::ConfigError;

// ============================================================================
// CHARACTER PROPERTIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterProperties {
    pub mass: f32,
    pub dash_cooldown: f32,
    pub dash_duration: f32,
    pub dash_scalar: f32,
    pub run_force: f32,
    pub running_stop_threshold: f32,
    pub max_velocity: f32,
    pub radius: f32,
    pub weapon_name: String,
    pub hp_max: f32,
    pub chase_distance: f32,
    pub invincible: bool,
}

impl Default for CharacterProperties {
    fn default() -> Self {
        Self {
            mass: 10.0,
            dash_cooldown: 1.0,
            dash_duration: 0.2,
            dash_scalar: 2.0,
            run_force: 20_000.0,
            running_stop_threshold: 1.0,
            max_velocity: 5.0,
            radius: 0.5,
            weapon_name: "sword".to_string(),
            hp_max: 1.0,
            chase_distance: 15.0,
            invincible: false,
        }
    }
}

// ============================================================================
// WEAPONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Melee,
    Ranged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedProfile {
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub clip_size: u32,
    pub reload_time: f32,
    #[serde(default)]
    pub emitter_offset_x: f32,
    #[serde(default)]
    pub emitter_offset_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    #[serde(default)]
    pub name: String,
    pub attack_duration: f32,
    pub attack_distance: f32,
    pub attack_time_until_damage: f32,
    pub attack_type: AttackType,
    #[serde(default)]
    pub ranged: Option<RangedProfile>,
}

impl Weapon {
    /// Projectile parameters, present only for ranged weapons.
    pub fn ranged(&self) -> Option<&RangedProfile> {
        match self.attack_type {
            AttackType::Ranged => self.ranged.as_ref(),
            AttackType::Melee => None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.attack_type == AttackType::Ranged && self.ranged.is_none() {
            return Err(ConfigError::MissingRangedProfile(self.name.clone()));
        }
        Ok(())
    }
}

fn builtin_weapons() -> HashMap<String, Weapon> {
    let sword = Weapon {
        name: "sword".to_string(),
        attack_duration: 0.5,
        attack_distance: 1.5,
        attack_time_until_damage: 0.2,
        attack_type: AttackType::Melee,
        ranged: None,
    };
    let blaster = Weapon {
        name: "blaster".to_string(),
        attack_duration: 0.3,
        attack_distance: 10.0,
        attack_time_until_damage: 0.1,
        attack_type: AttackType::Ranged,
        ranged: Some(RangedProfile {
            projectile_speed: 15.0,
            projectile_radius: 0.2,
            clip_size: 6,
            reload_time: 1.5,
            emitter_offset_x: 0.0,
            emitter_offset_y: 0.0,
        }),
    };
    [sword, blaster]
        .into_iter()
        .map(|weapon| (weapon.name.clone(), weapon))
        .collect()
}

fn builtin_properties(character_type: CharacterType) -> CharacterProperties {
    match character_type {
        CharacterType::Pigsassin => CharacterProperties {
            weapon_name: "blaster".to_string(),
            hp_max: 10.0,
            ..Default::default()
        },
        CharacterType::ShadowGuardian => CharacterProperties {
            max_velocity: 3.0,
            hp_max: 3.0,
            ..Default::default()
        },
        CharacterType::DroidAssassin => CharacterProperties {
            max_velocity: 4.0,
            weapon_name: "blaster".to_string(),
            hp_max: 2.0,
            chase_distance: 12.0,
            ..Default::default()
        },
    }
}

// ============================================================================
// GAME DATA
// ============================================================================

/// A character type's properties with its weapon already resolved.
#[derive(Debug, Clone)]
pub struct CharacterSheet {
    pub character_type: CharacterType,
    pub properties: CharacterProperties,
    pub weapon: Arc<Weapon>,
}

/// Every character sheet the zone can instantiate.
///
/// Holds exactly one sheet per `CharacterType`, stored in `CharacterType::ALL`
/// order.
#[derive(Debug, Clone)]
pub struct GameData {
    sheets: Vec<CharacterSheet>,
}

impl GameData {
    /// Built-in sheets only; no file access.
    pub fn builtin() -> Self {
        let weapons = builtin_weapons();
        let sheets = CharacterType::ALL
            .iter()
            .map(|&character_type| {
                let properties = builtin_properties(character_type);
                let weapon = Arc::new(weapons[&properties.weapon_name].clone());
                CharacterSheet { character_type, properties, weapon }
            })
            .collect();
        Self { sheets }
    }

    /// Load sheets from `data_root`, falling back to built-ins per file.
    /// A weapon file on disk takes precedence over the built-in of the same name.
    pub fn load(data_root: &Path) -> Result<Self, ConfigError> {
        let mut builtins = builtin_weapons();
        let mut weapons: HashMap<String, Arc<Weapon>> = HashMap::new();

        let mut sheets = Vec::with_capacity(CharacterType::ALL.len());
        for character_type in CharacterType::ALL {
            let path = data_root
                .join("characters")
                .join(format!("{}.toml", character_type.short_name()));
            let properties = if path.exists() {
                read_toml::<CharacterProperties>(&path)?
            } else {
                builtin_properties(character_type)
            };

            let name = &properties.weapon_name;
            let weapon = match weapons.get(name) {
                Some(weapon) => weapon.clone(),
                None => {
                    let weapon_path = data_root.join("weapons").join(format!("{name}.toml"));
                    let weapon = if weapon_path.exists() {
                        let mut weapon = read_toml::<Weapon>(&weapon_path)?;
                        weapon.name = name.clone();
                        weapon.validate()?;
                        weapon
                    } else if let Some(weapon) = builtins.remove(name) {
                        weapon
                    } else {
                        return Err(ConfigError::UnknownWeapon {
                            character: character_type.short_name().to_string(),
                            weapon: name.clone(),
                        });
                    };
                    let weapon = Arc::new(weapon);
                    weapons.insert(name.clone(), weapon.clone());
                    weapon
                }
            };

            sheets.push(CharacterSheet { character_type, properties, weapon });
        }
        Ok(Self { sheets })
    }

    pub fn sheet(&self, character_type: CharacterType) -> &CharacterSheet {
        let index = CharacterType::ALL
            .iter()
            .position(|&candidate| candidate == character_type)
            .unwrap_or_default();
        &self.sheets[index]
    }
}

// ============================================================================
// ZONES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyGroup {
    pub character_type: CharacterType,
    pub count: u32,
    pub center_x: i32,
    pub center_y: i32,
}

fn default_spawn_frequency() -> f32 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    pub character_type: CharacterType,
    #[serde(default)]
    pub offset_x: i32,
    #[serde(default)]
    pub offset_y: i32,
    #[serde(default = "default_spawn_frequency")]
    pub spawn_frequency_s: f32,
}

/// A placed map feature (factory, camp) that may carry spawners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFeature {
    pub tmx_name: String,
    pub center_x: i32,
    pub center_y: i32,
    #[serde(default)]
    pub spawners: Vec<Spawner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Medic {
    pub x: f32,
    pub y: f32,
}

/// Static collision rectangle, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default)]
    pub tmx_path: String,
    #[serde(default)]
    pub start_x: f32,
    #[serde(default)]
    pub start_y: f32,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub enemy_groups: Vec<EnemyGroup>,
    #[serde(default)]
    pub environment_features: Vec<EnvironmentFeature>,
    #[serde(default)]
    pub medics: Vec<Medic>,
}

impl Zone {
    pub fn load(data_root: &Path, zone_name: &str) -> Result<Self, ConfigError> {
        let path = data_root.join("zones").join(format!("{zone_name}.toml"));
        read_toml(&path)
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_data_has_a_sheet_per_character_type() {
        let data = GameData::builtin();
        for character_type in CharacterType::ALL {
            let sheet = data.sheet(character_type);
            assert_eq!(sheet.character_type, character_type);
            assert_eq!(sheet.weapon.name, sheet.properties.weapon_name);
        }
        assert!(data.sheet(CharacterType::Pigsassin).weapon.ranged().is_some());
        assert!(data.sheet(CharacterType::ShadowGuardian).weapon.ranged().is_none());
    }

    #[test]
    fn zone_parses_with_spawner_defaults() {
        let zone: Zone = toml::from_str(
            r#"
            tmx_path = "maps/1.tmx"
            start_x = 4.0
            start_y = 2.0

            [[enemy_groups]]
            character_type = "shadow_guardian"
            count = 3
            center_x = 10
            center_y = 0

            [[environment_features]]
            tmx_name = "factory_sm"
            center_x = 20
            center_y = 0

            [[environment_features.spawners]]
            character_type = "droid_assassin"
            offset_y = -1

            [[medics]]
            x = 1.0
            y = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(zone.enemy_groups[0].character_type, CharacterType::ShadowGuardian);
        let spawner = &zone.environment_features[0].spawners[0];
        assert_eq!(spawner.offset_x, 0);
        assert_eq!(spawner.offset_y, -1);
        assert_eq!(spawner.spawn_frequency_s, 10.0);
        assert_eq!(zone.medics.len(), 1);
        assert!(zone.obstacles.is_empty());
    }

    #[test]
    fn load_reads_sheets_and_weapons_from_disk() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("characters")).unwrap();
        fs::create_dir_all(root.path().join("weapons")).unwrap();
        fs::write(
            root.path().join("characters/shadow_guardian.toml"),
            "weapon_name = \"halberd\"\nhp_max = 7.0\n",
        )
        .unwrap();
        fs::write(
            root.path().join("weapons/halberd.toml"),
            "attack_duration = 1.0\nattack_distance = 2.5\nattack_time_until_damage = 0.4\nattack_type = \"melee\"\n",
        )
        .unwrap();

        let data = GameData::load(root.path()).unwrap();
        let sheet = data.sheet(CharacterType::ShadowGuardian);
        assert_eq!(sheet.properties.hp_max, 7.0);
        assert_eq!(sheet.weapon.name, "halberd");
        assert_eq!(sheet.weapon.attack_distance, 2.5);
        // Untouched types keep their built-in sheet.
        assert_eq!(data.sheet(CharacterType::Pigsassin).properties.hp_max, 10.0);
    }

    #[test]
    fn load_prefers_weapon_file_over_builtin() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("weapons")).unwrap();
        fs::write(
            root.path().join("weapons/sword.toml"),
            "attack_duration = 0.5\nattack_distance = 4.0\nattack_time_until_damage = 0.2\nattack_type = \"melee\"\n",
        )
        .unwrap();

        let data = GameData::load(root.path()).unwrap();
        let sheet = data.sheet(CharacterType::ShadowGuardian);
        assert_eq!(sheet.properties.weapon_name, "sword");
        assert_eq!(sheet.weapon.name, "sword");
        assert_eq!(sheet.weapon.attack_distance, 4.0);
        assert_ne!(GameData::builtin().sheet(CharacterType::ShadowGuardian).weapon.attack_distance, 4.0);
    }

    #[test]
    fn load_rejects_unknown_weapon() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("characters")).unwrap();
        fs::write(
            root.path().join("characters/pigsassin.toml"),
            "weapon_name = \"trebuchet\"\n",
        )
        .unwrap();

        let err = GameData::load(root.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownWeapon { .. }));
    }

    #[test]
    fn load_rejects_ranged_weapon_without_profile() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("characters")).unwrap();
        fs::create_dir_all(root.path().join("weapons")).unwrap();
        fs::write(
            root.path().join("characters/droid_assassin.toml"),
            "weapon_name = \"slingshot\"\n",
        )
        .unwrap();
        fs::write(
            root.path().join("weapons/slingshot.toml"),
            "attack_duration = 1.0\nattack_distance = 6.0\nattack_time_until_damage = 0.4\nattack_type = \"ranged\"\n",
        )
        .unwrap();

        let err = GameData::load(root.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRangedProfile(name) if name == "slingshot"));
    }
}
