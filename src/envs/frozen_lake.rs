use crate::error::{MdpError, Result};
use crate::mdps::mdp::{Action, Mdp, State, Transition, TransitionModel};
use itertools::Itertools;

pub const LEFT: Action = 0;
pub const DOWN: Action = 1;
pub const RIGHT: Action = 2;
pub const UP: Action = 3;

const ACTION_NAMES: [&str; 4] = ["Left", "Down", "Right", "Up"];
const ACTION_ARROWS: [char; 4] = ['←', '↓', '→', '↑'];

pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

pub const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF",
    "FFFHFFFG",
];

/// FrozenLake-v1 dynamics as a transition model.
///
/// `S` start, `F` frozen, `H` hole, `G` goal. Holes and the goal are absorbing. Entering
/// the goal pays 1, everything else 0. On a slippery lake the agent moves in the intended
/// direction or one of the two perpendicular ones, each with probability 1/3.
#[derive(Debug, Clone)]
pub struct FrozenLake {
    desc: Vec<Vec<u8>>,
    nrow: usize,
    ncol: usize,
    model: TransitionModel,
}

impl FrozenLake {
    pub fn new(desc: &[&str], is_slippery: bool, gamma: f64) -> Result<Self> {
        let desc = desc.iter().map(|row| row.as_bytes().to_vec()).collect_vec();
        let nrow = desc.len();
        let ncol = desc.first().map_or(0, Vec::len);
        if nrow == 0 || ncol == 0 {
            return Err(MdpError::InvalidMap("map is empty".to_string()));
        }
        if let Some(r) = desc.iter().position(|row| row.len() != ncol) {
            return Err(MdpError::InvalidMap(format!(
                "row {r} is not {ncol} cells wide"
            )));
        }
        if let Some(&c) = desc.iter().flatten().find(|&&c| !b"SFHG".contains(&c)) {
            return Err(MdpError::InvalidMap(format!(
                "unknown cell '{}'",
                c as char
            )));
        }
        if !desc.iter().flatten().contains(&b'S') {
            return Err(MdpError::InvalidMap("no start cell".to_string()));
        }

        let mut model = TransitionModel::new(nrow * ncol, ACTION_NAMES.len(), gamma)?;
        for (row, col) in (0..nrow).cartesian_product(0..ncol) {
            let s = row * ncol + col;
            for a in 0..ACTION_NAMES.len() {
                let ts = if b"GH".contains(&desc[row][col]) {
                    vec![Transition::new(1., s, 0., true)]
                } else if is_slippery {
                    [(a + 3) % 4, a, (a + 1) % 4]
                        .into_iter()
                        .map(|b| Self::step_to(&desc, row, col, b, 1. / 3.))
                        .collect()
                } else {
                    vec![Self::step_to(&desc, row, col, a, 1.)]
                };
                model.insert(s, a, ts)?;
            }
        }

        Ok(Self {
            desc,
            nrow,
            ncol,
            model,
        })
    }

    pub fn map_4x4(is_slippery: bool, gamma: f64) -> Result<Self> {
        Self::new(&MAP_4X4, is_slippery, gamma)
    }

    pub fn map_8x8(is_slippery: bool, gamma: f64) -> Result<Self> {
        Self::new(&MAP_8X8, is_slippery, gamma)
    }

    fn step_to(desc: &[Vec<u8>], row: usize, col: usize, a: Action, p: f64) -> Transition {
        let (nrow, ncol) = (desc.len(), desc[0].len());
        let (row, col) = match a {
            LEFT => (row, col.saturating_sub(1)),
            DOWN => ((row + 1).min(nrow - 1), col),
            RIGHT => (row, (col + 1).min(ncol - 1)),
            _ => (row.saturating_sub(1), col),
        };
        let letter = desc[row][col];

        Transition::new(p, row * ncol + col, f64::from(letter == b'G'), b"GH".contains(&letter))
    }

    pub fn model(&self) -> &TransitionModel {
        &self.model
    }

    pub fn into_model(self) -> TransitionModel {
        self.model
    }

    pub fn start(&self) -> State {
        self.desc.iter().flatten().position(|&c| c == b'S').unwrap_or_default()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    /// ANSI frame in the gym style: the last action on the first line, the agent's cell
    /// highlighted in red.
    pub fn render(&self, s: State, last_action: Option<Action>) -> String {
        let mut out = match last_action.and_then(|a| ACTION_NAMES.get(a)) {
            Some(name) => format!("  ({name})\n"),
            None => "\n".to_string(),
        };
        for (row, line) in self.desc.iter().enumerate() {
            for (col, &c) in line.iter().enumerate() {
                if row * self.ncol + col == s {
                    out.push_str(&format!("\u{1b}[41m{}\u{1b}[0m", c as char));
                } else {
                    out.push(c as char);
                }
            }
            out.push('\n');
        }

        out
    }

    /// Arrow per frozen cell; holes and the goal keep their letter.
    pub fn render_policy(&self, policy: &[Action]) -> String {
        self.desc
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.iter()
                    .enumerate()
                    .map(|(col, &c)| match c {
                        b'H' | b'G' => c as char,
                        _ => policy
                            .get(row * self.ncol + col)
                            .and_then(|&a| ACTION_ARROWS.get(a))
                            .copied()
                            .unwrap_or('?'),
                    })
                    .collect::<String>()
            })
            .join("\n")
    }

    pub fn render_values(&self, v: &[f64]) -> String {
        v.chunks(self.ncol)
            .map(|row| row.iter().map(|x| format!("{x:.3}")).join(" "))
            .join("\n")
    }
}

impl Mdp for FrozenLake {
    fn n_s(&self) -> usize {
        self.model.n_s()
    }

    fn n_a(&self) -> usize {
        self.model.n_a()
    }

    fn transitions(&self, s: State, a: Action) -> &[Transition] {
        self.model.transitions(s, a)
    }

    fn gamma(&self) -> f64 {
        self.model.gamma()
    }
}
