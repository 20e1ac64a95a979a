pub mod command;
pub mod variant;

pub use command::{AccCommand, BrakeCommand, CanFrame, CruiseButton, HudData, SteeringCommand, UiCommand};
pub use variant::{ParseVariantError, Variant};

/// Renders semantic controller decisions into addressed bus frames.
///
/// One method per command kind. Implementations own the byte layout,
/// checksums and counters; the control core never inspects `CanFrame::data`.
/// Methods must not block: they run inside the fixed-rate control cycle.
pub trait CommandEncoder {
    fn steering(&mut self, cmd: &SteeringCommand) -> CanFrame;

    /// Composite longitudinal command for platforms that take acceleration
    /// directly (may span several frames).
    fn acc(&mut self, cmd: &AccCommand) -> Vec<CanFrame>;

    fn brake(&mut self, cmd: &BrakeCommand<'_>) -> CanFrame;

    /// Supplemental gas pedal interceptor command, `apply_gas` in [0, 1].
    fn gas(&mut self, apply_gas: f32, idx: u8) -> CanFrame;

    /// Dashboard and lane-keep HUD frames.
    fn ui(&mut self, cmd: &UiCommand<'_>) -> Vec<CanFrame>;

    /// Keep-alive the stock ACC expects while it owns longitudinal control.
    fn acc_supplemental(&mut self, variant: Variant, idx: u8) -> CanFrame;

    /// Diagnostic tester-present that keeps the radar unit passive.
    fn radar_keep_alive(&mut self) -> CanFrame;

    fn button(&mut self, button: CruiseButton, variant: Variant, idx: u8) -> CanFrame;
}
