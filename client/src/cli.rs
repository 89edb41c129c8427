use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
pub struct Cli {
    /// How verbose should logging on the terminal be
    #[clap(long, value_enum, default_value = "warn")]
    pub log_level: LevelFilter,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LevelFilter {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk and display the camera's descriptors, sending nothing
    Scan,

    /// Return the pan/tilt mechanism to its home position
    Reset,

    /// Pan the camera one step
    Pan {
        #[clap(value_enum)]
        direction: PanDirection,
    },

    /// Tilt the camera one step
    Tilt {
        #[clap(value_enum)]
        direction: TiltDirection,
    },

    /// Change the LED mode
    Led {
        #[clap(value_enum)]
        mode: LedSetting,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PanDirection {
    Left,
    Right,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TiltDirection {
    Up,
    Down,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LedSetting {
    On,
    Off,
    Auto,
}
