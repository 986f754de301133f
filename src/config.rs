use crate::error::Result;
use crate::grid::{Grid, Position};
use crate::playback::Speed;
use clap::Parser;

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 50;
pub const DEFAULT_SOURCE: Position = Position::new(10, 15);
pub const DEFAULT_TARGET: Position = Position::new(10, 35);
pub const DEFAULT_WALL_DENSITY: f64 = 0.3;

/// Dimensions and endpoints a grid is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    pub rows: usize,
    pub cols: usize,
    pub source: Position,
    pub target: Position,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            source: DEFAULT_SOURCE,
            target: DEFAULT_TARGET,
        }
    }
}

impl GridSettings {
    pub fn build(&self) -> Result<Grid> {
        Grid::new(self.rows, self.cols, self.source, self.target)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: usize,

    #[arg(long, default_value_t = DEFAULT_COLS)]
    pub cols: usize,

    #[arg(long, default_value_t = DEFAULT_SOURCE.row)]
    pub source_row: usize,

    #[arg(long, default_value_t = DEFAULT_SOURCE.col)]
    pub source_col: usize,

    #[arg(long, default_value_t = DEFAULT_TARGET.row)]
    pub target_row: usize,

    #[arg(long, default_value_t = DEFAULT_TARGET.col)]
    pub target_col: usize,

    #[arg(long, value_enum, default_value_t = Speed::Normal)]
    pub speed: Speed,

    /// Fill the board with random walls before the run
    #[arg(long, default_value_t = false)]
    pub random_walls: bool,

    #[arg(long, default_value_t = DEFAULT_WALL_DENSITY)]
    pub wall_density: f64,

    /// Seed for random walls; a fresh one is drawn when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Toggle a wall at ROW,COL (repeatable)
    #[arg(long = "wall", value_parser = parse_position)]
    pub walls: Vec<Position>,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,
}

impl Config {
    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            rows: self.rows,
            cols: self.cols,
            source: Position::new(self.source_row, self.source_col),
            target: Position::new(self.target_row, self.target_col),
        }
    }
}

fn parse_position(s: &str) -> std::result::Result<Position, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got `{}`", s))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("bad row in `{}`: {}", s, e))?;
    let col = col
        .trim()
        .parse()
        .map_err(|e| format!("bad column in `{}`: {}", s, e))?;
    Ok(Position::new(row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_board() {
        let config = Config::parse_from(["pathviz"]);
        assert_eq!(config.grid_settings(), GridSettings::default());
        assert_eq!(config.speed, Speed::Normal);
        assert!(config.walls.is_empty());
        assert!(GridSettings::default().build().is_ok());
    }

    #[test]
    fn parses_walls_and_speed() {
        let config = Config::parse_from([
            "pathviz", "--speed", "slow", "--wall", "1,2", "--wall", "3, 4", "--seed", "9",
        ]);
        assert_eq!(config.speed, Speed::Slow);
        assert_eq!(config.walls, vec![Position::new(1, 2), Position::new(3, 4)]);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn rejects_malformed_wall() {
        assert!(Config::try_parse_from(["pathviz", "--wall", "12"]).is_err());
        assert!(Config::try_parse_from(["pathviz", "--wall", "a,1"]).is_err());
    }

    #[test]
    fn coincident_endpoints_fail_to_build() {
        let config = Config::parse_from([
            "pathviz", "--target-row", "10", "--target-col", "15",
        ]);
        assert!(config.grid_settings().build().is_err());
    }
}
