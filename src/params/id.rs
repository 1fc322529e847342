use std::fmt;
use std::str::FromStr;

use crate::error::ParamError;
use crate::{MAX_LANES, NUM_STEPS};

/// Every automatable parameter, addressed the way a host addresses it.
///
/// String form: `inputGain`, `outputGain`, `dryPass`, `filterMode`,
/// `filterCutoff`, `filterResonance`, and per lane `laneN_stepM`,
/// `laneN_attack`, `laneN_hold`, `laneN_decay`, `laneN_rate`,
/// `laneN_destination`, `laneN_amount`. Lanes are 1-based in the string and
/// 0-based in the enum; steps are 0-based in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    InputGain,
    OutputGain,
    DryPass,
    FilterMode,
    FilterCutoff,
    FilterResonance,
    Step { lane: usize, step: usize },
    Attack(usize),
    Hold(usize),
    Decay(usize),
    Rate(usize),
    Destination(usize),
    Amount(usize),
}

impl ParamId {
    /// Lane this parameter belongs to, if any.
    pub fn lane(&self) -> Option<usize> {
        match *self {
            ParamId::Step { lane, .. }
            | ParamId::Attack(lane)
            | ParamId::Hold(lane)
            | ParamId::Decay(lane)
            | ParamId::Rate(lane)
            | ParamId::Destination(lane)
            | ParamId::Amount(lane) => Some(lane),
            _ => None,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParamId::InputGain => f.write_str("inputGain"),
            ParamId::OutputGain => f.write_str("outputGain"),
            ParamId::DryPass => f.write_str("dryPass"),
            ParamId::FilterMode => f.write_str("filterMode"),
            ParamId::FilterCutoff => f.write_str("filterCutoff"),
            ParamId::FilterResonance => f.write_str("filterResonance"),
            ParamId::Step { lane, step } => write!(f, "lane{}_step{}", lane + 1, step),
            ParamId::Attack(lane) => write!(f, "lane{}_attack", lane + 1),
            ParamId::Hold(lane) => write!(f, "lane{}_hold", lane + 1),
            ParamId::Decay(lane) => write!(f, "lane{}_decay", lane + 1),
            ParamId::Rate(lane) => write!(f, "lane{}_rate", lane + 1),
            ParamId::Destination(lane) => write!(f, "lane{}_destination", lane + 1),
            ParamId::Amount(lane) => write!(f, "lane{}_amount", lane + 1),
        }
    }
}

impl FromStr for ParamId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inputGain" => return Ok(ParamId::InputGain),
            "outputGain" => return Ok(ParamId::OutputGain),
            "dryPass" => return Ok(ParamId::DryPass),
            "filterMode" => return Ok(ParamId::FilterMode),
            "filterCutoff" => return Ok(ParamId::FilterCutoff),
            "filterResonance" => return Ok(ParamId::FilterResonance),
            _ => {}
        }

        let unknown = || ParamError::UnknownId(s.to_string());

        let rest = s.strip_prefix("lane").ok_or_else(unknown)?;
        let (lane, field) = rest.split_once('_').ok_or_else(unknown)?;
        let lane: usize = lane.parse().map_err(|_| unknown())?;
        if lane == 0 || lane > MAX_LANES {
            return Err(ParamError::LaneOutOfRange {
                lane,
                max: MAX_LANES,
            });
        }
        let lane = lane - 1;

        match field {
            "attack" => Ok(ParamId::Attack(lane)),
            "hold" => Ok(ParamId::Hold(lane)),
            "decay" => Ok(ParamId::Decay(lane)),
            "rate" => Ok(ParamId::Rate(lane)),
            "destination" => Ok(ParamId::Destination(lane)),
            "amount" => Ok(ParamId::Amount(lane)),
            _ => {
                let step = field.strip_prefix("step").ok_or_else(unknown)?;
                let step: usize = step.parse().map_err(|_| unknown())?;
                if step >= NUM_STEPS {
                    return Err(ParamError::StepOutOfRange {
                        step,
                        max: NUM_STEPS,
                    });
                }
                Ok(ParamId::Step { lane, step })
            }
        }
    }
}
