//! Annunciator lamp panel (the pixel strip behind the indicator window).

/// Lamp positions, in strip order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    ProgRun,
    Noun,
    Verb,
    CompActy,
    Temp,
    GimbalLock,
    Prog,
    Restart,
    Tracker,
    Alt,
    Vel,
    Blank1,
    Blank2,
    OprErr,
    KeyRel,
    Stby,
    NoAtt,
    UplinkActy,
}

/// Number of lamps on the strip.
pub const NUM_INDICATORS: usize = 18;

impl Indicator {
    pub const ALL: [Indicator; NUM_INDICATORS] = [
        Self::ProgRun,
        Self::Noun,
        Self::Verb,
        Self::CompActy,
        Self::Temp,
        Self::GimbalLock,
        Self::Prog,
        Self::Restart,
        Self::Tracker,
        Self::Alt,
        Self::Vel,
        Self::Blank1,
        Self::Blank2,
        Self::OprErr,
        Self::KeyRel,
        Self::Stby,
        Self::NoAtt,
        Self::UplinkActy,
    ];

    /// Lamp at strip position `i`.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Label as printed on the panel.
    pub fn label(self) -> &'static str {
        match self {
            Self::ProgRun => "PROG RUN",
            Self::Noun => "NOUN",
            Self::Verb => "VERB",
            Self::CompActy => "COMP ACTY",
            Self::Temp => "TEMP",
            Self::GimbalLock => "GIMBAL LOCK",
            Self::Prog => "PROG",
            Self::Restart => "RESTART",
            Self::Tracker => "TRACKER",
            Self::Alt => "ALT",
            Self::Vel => "VEL",
            Self::Blank1 => "",
            Self::Blank2 => "",
            Self::OprErr => "OPR ERR",
            Self::KeyRel => "KEY REL",
            Self::Stby => "STBY",
            Self::NoAtt => "NO ATT",
            Self::UplinkActy => "UPLINK ACTY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colour {
    #[default]
    WarmWhite,
    CoolWhite,
    PureWhite,
    Red,
    Green,
    Blue,
    Amber,
    Yellow,
    Cyan,
    Magenta,
    Rainbow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LampState {
    #[default]
    Off,
    On,
    SlowFlash,
    FastFlash,
    FadeUp,
    FadeDown,
    Breath,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lamp {
    pub colour: Colour,
    pub state: LampState,
}

impl Lamp {
    pub fn is_lit(&self) -> bool {
        self.state != LampState::Off
    }
}

/// The whole strip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorPanel {
    lamps: [Lamp; NUM_INDICATORS],
}

impl IndicatorPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, which: Indicator, colour: Colour, state: LampState) {
        self.lamps[which as usize] = Lamp { colour, state };
    }

    pub fn lamp(&self, which: Indicator) -> Lamp {
        self.lamps[which as usize]
    }

    pub fn all_off(&mut self) {
        for lamp in &mut self.lamps {
            lamp.state = LampState::Off;
        }
    }

    /// Lamps currently not off.
    pub fn lit(&self) -> impl Iterator<Item = (Indicator, Lamp)> + '_ {
        Indicator::ALL
            .iter()
            .zip(self.lamps.iter())
            .filter(|(_, lamp)| lamp.is_lit())
            .map(|(i, lamp)| (*i, *lamp))
    }

    pub fn any_lit(&self) -> bool {
        self.lamps.iter().any(Lamp::is_lit)
    }
}
