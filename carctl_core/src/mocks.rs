//! Test and replay helpers for carctl_core.

use carctl_traits::{
    AccCommand, BrakeCommand, CanFrame, CommandEncoder, CruiseButton, HudData, SteeringCommand,
    UiCommand, Variant,
};

/// Tester-present arbitration id that keeps the Bosch radar passive.
pub const RADAR_TESTER_PRESENT_ADDR: u32 = 0x18DA_B0F1;
/// Tester-present payload, suppress-response bit set.
pub const RADAR_TESTER_PRESENT_DATA: [u8; 8] = [0x02, 0x3E, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00];

const STEERING_CONTROL: u32 = 0xE4;
const BOSCH_SUPPLEMENTAL: u32 = 0xE5;
const ACC_CONTROL: u32 = 0x1DF;
const ACC_CONTROL_ON: u32 = 0x1EF;
const BRAKE_COMMAND: u32 = 0x1FA;
const GAS_COMMAND: u32 = 0x200;
const SCM_BUTTONS: u32 = 0x296;
const ACC_HUD: u32 = 0x30C;
const LKAS_HUD: u32 = 0x33D;

/// Semantic record of one encoder call.
#[derive(Debug, Clone, PartialEq)]
pub enum SentCommand {
    Steering(SteeringCommand),
    Acc(AccCommand),
    Brake {
        apply_brake: u16,
        pump_on: bool,
        pcm_override: bool,
        pcm_cancel: bool,
        fcw: u8,
        idx: u8,
    },
    Gas {
        apply_gas: f32,
        idx: u8,
    },
    Ui {
        pcm_speed: f32,
        hud: HudData,
        idx: u8,
    },
    AccSupplemental {
        idx: u8,
    },
    RadarKeepAlive,
    Button {
        button: CruiseButton,
        idx: u8,
    },
}

impl SentCommand {
    /// Short stable tag, used for logs and replay output.
    pub fn kind(&self) -> &'static str {
        match self {
            SentCommand::Steering(_) => "steering",
            SentCommand::Acc(_) => "acc",
            SentCommand::Brake { .. } => "brake",
            SentCommand::Gas { .. } => "gas",
            SentCommand::Ui { .. } => "ui",
            SentCommand::AccSupplemental { .. } => "acc_supplemental",
            SentCommand::RadarKeepAlive => "radar_keep_alive",
            SentCommand::Button { .. } => "button",
        }
    }
}

/// Encoder that records every call and returns placeholder frames on
/// Honda-style addresses. Only the radar tester-present carries real bytes.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    sent: Vec<SentCommand>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[SentCommand] {
        &self.sent
    }

    /// Drain the record, leaving the encoder empty for the next cycle.
    pub fn take(&mut self) -> Vec<SentCommand> {
        std::mem::take(&mut self.sent)
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }

    pub fn buttons(&self) -> impl Iterator<Item = CruiseButton> + '_ {
        self.sent.iter().filter_map(|c| match c {
            SentCommand::Button { button, .. } => Some(*button),
            _ => None,
        })
    }

    pub fn steering(&self) -> impl Iterator<Item = &SteeringCommand> + '_ {
        self.sent.iter().filter_map(|c| match c {
            SentCommand::Steering(s) => Some(s),
            _ => None,
        })
    }

    pub fn count(&self, kind: &str) -> usize {
        self.sent.iter().filter(|c| c.kind() == kind).count()
    }
}

impl CommandEncoder for RecordingEncoder {
    fn steering(&mut self, cmd: &SteeringCommand) -> CanFrame {
        self.sent.push(SentCommand::Steering(*cmd));
        CanFrame::new(STEERING_CONTROL, 0, Vec::new())
    }

    fn acc(&mut self, cmd: &AccCommand) -> Vec<CanFrame> {
        self.sent.push(SentCommand::Acc(*cmd));
        vec![
            CanFrame::new(ACC_CONTROL, 0, Vec::new()),
            CanFrame::new(ACC_CONTROL_ON, 0, Vec::new()),
        ]
    }

    fn brake(&mut self, cmd: &BrakeCommand<'_>) -> CanFrame {
        self.sent.push(SentCommand::Brake {
            apply_brake: cmd.apply_brake,
            pump_on: cmd.pump_on,
            pcm_override: cmd.pcm_override,
            pcm_cancel: cmd.pcm_cancel,
            fcw: cmd.fcw,
            idx: cmd.idx,
        });
        CanFrame::new(BRAKE_COMMAND, 0, Vec::new())
    }

    fn gas(&mut self, apply_gas: f32, idx: u8) -> CanFrame {
        self.sent.push(SentCommand::Gas { apply_gas, idx });
        CanFrame::new(GAS_COMMAND, 0, Vec::new())
    }

    fn ui(&mut self, cmd: &UiCommand<'_>) -> Vec<CanFrame> {
        self.sent.push(SentCommand::Ui {
            pcm_speed: cmd.pcm_speed,
            hud: cmd.hud,
            idx: cmd.idx,
        });
        vec![
            CanFrame::new(ACC_HUD, 0, Vec::new()),
            CanFrame::new(LKAS_HUD, 0, Vec::new()),
        ]
    }

    fn acc_supplemental(&mut self, _variant: Variant, idx: u8) -> CanFrame {
        self.sent.push(SentCommand::AccSupplemental { idx });
        CanFrame::new(BOSCH_SUPPLEMENTAL, 0, Vec::new())
    }

    fn radar_keep_alive(&mut self) -> CanFrame {
        self.sent.push(SentCommand::RadarKeepAlive);
        CanFrame::new(
            RADAR_TESTER_PRESENT_ADDR,
            0,
            RADAR_TESTER_PRESENT_DATA.to_vec(),
        )
    }

    fn button(&mut self, button: CruiseButton, _variant: Variant, idx: u8) -> CanFrame {
        self.sent.push(SentCommand::Button { button, idx });
        CanFrame::new(SCM_BUTTONS, 0, Vec::new())
    }
}
