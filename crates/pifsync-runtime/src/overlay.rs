//! Layered settings resolution.
//!
//! Effective settings are built from three layers, applied in order: the
//! user's global settings, the per-game overrides (only when the game has
//! them enabled), and the forced-deterministic layer used by rendezvous
//! sessions. Later layers win.

use std::path::PathBuf;

use tracing::debug;

/// RSP plugin every rendezvous participant must run.
#[cfg(windows)]
pub const DETERMINISTIC_RSP_PLUGIN: &str = "mupen64plus-rsp-cxd4.dll";
#[cfg(not(windows))]
pub const DETERMINISTIC_RSP_PLUGIN: &str = "mupen64plus-rsp-cxd4.so";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::FromRepr, strum::EnumIter,
)]
#[repr(u8)]
pub enum CpuEmulator {
    #[strum(serialize = "pure interpreter")]
    PureInterpreter = 0,
    #[strum(serialize = "cached interpreter")]
    CachedInterpreter = 1,
    #[default]
    #[strum(serialize = "dynamic recompiler")]
    DynamicRecompiler = 2,
}

impl CpuEmulator {
    /// Interpreter modes boot through the PIF ROM when one is configured.
    pub fn is_interpreter(self) -> bool {
        !matches!(self, Self::DynamicRecompiler)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PifSettings {
    pub use_pif: bool,
    pub ntsc_image: Option<PathBuf>,
    pub pal_image: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    pub randomize_interrupt: bool,
    pub cpu_emulator: CpuEmulator,
    pub disable_extra_mem: bool,
    pub enable_debugger: bool,
    pub count_per_op: i32,
    pub count_per_op_denom_pot: i32,
    /// Negative selects the engine's built-in timing.
    pub si_dma_duration: i32,
    pub save_filename_format: i32,
    pub gb_camera_backend: String,
    pub rsp_plugin: String,
    pub pif: PifSettings,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            randomize_interrupt: true,
            cpu_emulator: CpuEmulator::default(),
            disable_extra_mem: false,
            enable_debugger: false,
            count_per_op: 0,
            count_per_op_denom_pot: 0,
            si_dma_duration: -1,
            save_filename_format: 1,
            gb_camera_backend: String::new(),
            rsp_plugin: String::new(),
            pif: PifSettings::default(),
        }
    }
}

impl CoreSettings {
    /// Overwrites every field that could make two participants diverge.
    pub fn force_deterministic(&mut self) {
        self.randomize_interrupt = false;
        self.cpu_emulator = CpuEmulator::PureInterpreter;
        self.count_per_op = 0;
        self.count_per_op_denom_pot = 0;
        self.si_dma_duration = -1;
        self.rsp_plugin = DETERMINISTIC_RSP_PLUGIN.to_owned();
    }
}

/// Per-game overrides. Ignored unless `override_enabled` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameOverrides {
    pub override_enabled: bool,
    pub randomize_interrupt: bool,
    pub cpu_emulator: CpuEmulator,
    pub count_per_op_denom_pot: i32,
}

impl GameOverrides {
    fn apply_to(&self, settings: &mut CoreSettings) {
        settings.randomize_interrupt = self.randomize_interrupt;
        settings.cpu_emulator = self.cpu_emulator;
        settings.count_per_op_denom_pot = self.count_per_op_denom_pot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum OverlayLayer {
    #[strum(serialize = "global")]
    Global,
    #[strum(serialize = "game")]
    Game,
    #[strum(serialize = "forced-deterministic")]
    ForcedDeterministic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    settings: CoreSettings,
    layers: Vec<OverlayLayer>,
}

impl EffectiveConfig {
    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn into_settings(self) -> CoreSettings {
        self.settings
    }

    /// Layers that contributed, in application order.
    pub fn layers(&self) -> &[OverlayLayer] {
        &self.layers
    }

    pub fn has_layer(&self, layer: OverlayLayer) -> bool {
        self.layers.contains(&layer)
    }
}

pub fn resolve(
    global: &CoreSettings,
    game: Option<&GameOverrides>,
    force_deterministic: bool,
) -> EffectiveConfig {
    let mut settings = global.clone();
    let mut layers = vec![OverlayLayer::Global];

    if let Some(game) = game.filter(|game| game.override_enabled) {
        game.apply_to(&mut settings);
        layers.push(OverlayLayer::Game);
    }

    if force_deterministic {
        settings.force_deterministic();
        layers.push(OverlayLayer::ForcedDeterministic);
    }

    debug!(
        layers = ?layers,
        cpu = %settings.cpu_emulator,
        randomize_interrupt = settings.randomize_interrupt,
        "resolved settings overlay"
    );
    EffectiveConfig { settings, layers }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(enabled: bool) -> GameOverrides {
        GameOverrides {
            override_enabled: enabled,
            randomize_interrupt: false,
            cpu_emulator: CpuEmulator::CachedInterpreter,
            count_per_op_denom_pot: 3,
        }
    }

    #[test]
    fn global_only_is_passed_through() {
        let global = CoreSettings {
            count_per_op: 2,
            ..CoreSettings::default()
        };
        let effective = resolve(&global, None, false);
        assert_eq!(effective.settings(), &global);
        assert_eq!(effective.layers(), &[OverlayLayer::Global]);
    }

    #[test]
    fn enabled_game_overrides_replace_their_fields() {
        let global = CoreSettings::default();
        let effective = resolve(&global, Some(&game(true)), false);
        let settings = effective.settings();
        assert!(!settings.randomize_interrupt);
        assert_eq!(settings.cpu_emulator, CpuEmulator::CachedInterpreter);
        assert_eq!(settings.count_per_op_denom_pot, 3);
        assert_eq!(settings.si_dma_duration, global.si_dma_duration);
        assert!(effective.has_layer(OverlayLayer::Game));
    }

    #[test]
    fn disabled_game_overrides_are_ignored() {
        let global = CoreSettings::default();
        let effective = resolve(&global, Some(&game(false)), false);
        assert_eq!(effective.settings(), &global);
        assert!(!effective.has_layer(OverlayLayer::Game));
    }

    #[test]
    fn forced_layer_wins_over_game_and_global() {
        let global = CoreSettings {
            count_per_op: 4,
            si_dma_duration: 900,
            rsp_plugin: "mupen64plus-rsp-hle".to_owned(),
            ..CoreSettings::default()
        };
        let effective = resolve(&global, Some(&game(true)), true);
        let settings = effective.settings();
        assert!(!settings.randomize_interrupt);
        assert_eq!(settings.cpu_emulator, CpuEmulator::PureInterpreter);
        assert_eq!(settings.count_per_op, 0);
        assert_eq!(settings.count_per_op_denom_pot, 0);
        assert_eq!(settings.si_dma_duration, -1);
        assert_eq!(settings.rsp_plugin, DETERMINISTIC_RSP_PLUGIN);
        assert_eq!(
            effective.layers(),
            &[
                OverlayLayer::Global,
                OverlayLayer::Game,
                OverlayLayer::ForcedDeterministic
            ]
        );
    }

    #[test]
    fn forced_layer_keeps_unrelated_fields() {
        let global = CoreSettings {
            disable_extra_mem: true,
            save_filename_format: 0,
            ..CoreSettings::default()
        };
        let settings = resolve(&global, None, true).into_settings();
        assert!(settings.disable_extra_mem);
        assert_eq!(settings.save_filename_format, 0);
    }

    #[test]
    fn only_dynarec_skips_interpreter_boot() {
        use strum::IntoEnumIterator;
        let interpreters: Vec<_> = CpuEmulator::iter()
            .filter(|cpu| cpu.is_interpreter())
            .collect();
        assert_eq!(
            interpreters,
            vec![CpuEmulator::PureInterpreter, CpuEmulator::CachedInterpreter]
        );
        assert_eq!(CpuEmulator::from_repr(2), Some(CpuEmulator::DynamicRecompiler));
    }
}
