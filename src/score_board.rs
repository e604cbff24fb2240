//! The two teams and their points.

use crate::telemetry::{InvariantChecker, InvariantViolation};
use crate::{StonesError, StonesResult, TeamIndex};

/// Default display name of team 1.
pub const DEFAULT_TEAM1_NAME: &str = "Team 1";
/// Default display name of team 2.
pub const DEFAULT_TEAM2_NAME: &str = "Team 2";
/// Default color of team 1.
pub const DEFAULT_TEAM1_COLOR: &str = "#00ff00";
/// Default color of team 2.
pub const DEFAULT_TEAM2_COLOR: &str = "#ff0000";

/// Returns `true` for `#rrggbb` hex colors.
#[must_use]
pub fn is_valid_color(color: &str) -> bool {
    let bytes = color.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

fn validated_color(color: &str) -> StonesResult<String> {
    if is_valid_color(color) {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(StonesError::InvalidColor {
            color: color.to_owned(),
        })
    }
}

/// One team: display name, color and points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Team {
    name: String,
    color: String,
    points: u32,
}

impl Team {
    /// A team with zero points.
    ///
    /// # Errors
    ///
    /// [`StonesError::InvalidColor`] unless `color` is `#rrggbb`.
    pub fn new(name: impl Into<String>, color: &str) -> StonesResult<Self> {
        Ok(Self {
            name: name.into(),
            color: validated_color(color)?,
            points: 0,
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `#rrggbb` color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Points scored.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }
}

/// Names and colors used when teams are reset or a field is left blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDefaults {
    names: [String; 2],
    colors: [String; 2],
}

impl Default for TeamDefaults {
    fn default() -> Self {
        Self {
            names: [DEFAULT_TEAM1_NAME.to_owned(), DEFAULT_TEAM2_NAME.to_owned()],
            colors: [DEFAULT_TEAM1_COLOR.to_owned(), DEFAULT_TEAM2_COLOR.to_owned()],
        }
    }
}

impl TeamDefaults {
    /// Custom defaults.
    ///
    /// # Errors
    ///
    /// [`StonesError::InvalidColor`] if either color is not `#rrggbb`.
    pub fn new(names: [&str; 2], colors: [&str; 2]) -> StonesResult<Self> {
        Ok(Self {
            names: [names[0].to_owned(), names[1].to_owned()],
            colors: [validated_color(colors[0])?, validated_color(colors[1])?],
        })
    }

    /// The default team at `index`.
    #[must_use]
    pub fn team(&self, index: TeamIndex) -> Team {
        let i = index.as_usize();
        Team {
            name: self.names[i].clone(),
            color: self.colors[i].clone(),
            points: 0,
        }
    }
}

/// Both teams of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    teams: [Team; 2],
    defaults: TeamDefaults,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new(TeamDefaults::default())
    }
}

impl ScoreBoard {
    /// A scoreboard with both teams at their defaults.
    #[must_use]
    pub fn new(defaults: TeamDefaults) -> Self {
        Self {
            teams: [
                defaults.team(TeamIndex::First),
                defaults.team(TeamIndex::Second),
            ],
            defaults,
        }
    }

    /// The team at `index`.
    #[must_use]
    pub fn team(&self, index: TeamIndex) -> &Team {
        &self.teams[index.as_usize()]
    }

    /// Both teams in display order.
    #[must_use]
    pub fn teams(&self) -> &[Team; 2] {
        &self.teams
    }

    /// Adds a point and returns the new total.
    pub fn score(&mut self, index: TeamIndex) -> u32 {
        let team = &mut self.teams[index.as_usize()];
        team.points = team.points.saturating_add(1);
        team.points
    }

    /// Removes a point. Returns `false` (and changes nothing) at zero.
    pub fn unscore(&mut self, index: TeamIndex) -> bool {
        let team = &mut self.teams[index.as_usize()];
        if team.points == 0 {
            return false;
        }
        team.points -= 1;
        true
    }

    /// Sets one team's points to zero.
    pub fn reset_points(&mut self, index: TeamIndex) {
        self.teams[index.as_usize()].points = 0;
    }

    /// Restores default names, colors and zero points for both teams.
    pub fn reset(&mut self) {
        self.teams = [
            self.defaults.team(TeamIndex::First),
            self.defaults.team(TeamIndex::Second),
        ];
    }

    /// Swaps the two teams (names, colors and points).
    pub fn flip(&mut self) {
        self.teams.swap(0, 1);
    }

    /// Renames and recolors a team, keeping its points. Blank values fall back
    /// to the defaults.
    ///
    /// # Errors
    ///
    /// [`StonesError::InvalidColor`] for a non-blank color that is not
    /// `#rrggbb`. The team is left unchanged.
    pub fn set_team(&mut self, index: TeamIndex, name: &str, color: &str) -> StonesResult<()> {
        let i = index.as_usize();
        let color = if color.trim().is_empty() {
            self.defaults.colors[i].clone()
        } else {
            validated_color(color.trim())?
        };
        let name = if name.trim().is_empty() {
            self.defaults.names[i].clone()
        } else {
            name.trim().to_owned()
        };
        let team = &mut self.teams[i];
        team.name = name;
        team.color = color;
        Ok(())
    }

    /// Recolors a team.
    ///
    /// # Errors
    ///
    /// [`StonesError::InvalidColor`] unless `color` is `#rrggbb`.
    pub fn set_color(&mut self, index: TeamIndex, color: &str) -> StonesResult<()> {
        self.teams[index.as_usize()].color = validated_color(color)?;
        Ok(())
    }

    /// Replaces both teams, e.g. from a history entry.
    pub fn restore(&mut self, first: Team, second: Team) {
        self.teams = [first, second];
    }
}

impl InvariantChecker for ScoreBoard {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (i, team) in self.teams.iter().enumerate() {
            if !is_valid_color(&team.color) {
                return Err(InvariantViolation::new("ScoreBoard", "team color is not #rrggbb")
                    .with_details(format!("team={}, color={:?}", i + 1, team.color)));
            }
        }
        Ok(())
    }
}
