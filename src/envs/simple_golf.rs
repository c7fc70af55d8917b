use crate::mdps::mdp::{Action, Mdp, State, Transition};

/// https://towardsdatascience.com/reinforcement-learning-an-easy-introduction-to-value-iteration-e4cfe0731fd5
///
/// States: 0 tee, 1 green, 2 hole. Actions: 0 hit to green, 1 hit to tee, 2 putt.
/// Only (tee, hit to green), (green, hit to tee) and (green, putt) have outcomes.
pub struct SimpleGolf {
    gamma: f64,
    n_s: usize,
    n_a: usize,
    transitions: Vec<Vec<Transition>>,
}

impl SimpleGolf {
    pub fn new(gamma: f64) -> Self {
        let (n_s, n_a) = (3, 3);
        let mut transitions = vec![vec![]; n_s * n_a];
        transitions[0] = vec![
            Transition::new(0.9, 1, 0., false),
            Transition::new(0.1, 0, 0., false),
        ];
        transitions[n_a + 1] = vec![
            Transition::new(0.9, 0, 0., false),
            Transition::new(0.1, 1, 0., false),
        ];
        transitions[n_a + 2] = vec![
            Transition::new(0.9, 2, 10., true),
            Transition::new(0.1, 1, 0., false),
        ];

        Self {
            gamma,
            n_s,
            n_a,
            transitions,
        }
    }
}

impl Mdp for SimpleGolf {
    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn transitions(&self, s: State, a: Action) -> &[Transition] {
        &self.transitions[s * self.n_a + a]
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }
}
