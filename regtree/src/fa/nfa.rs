//! NFA (Nondeterministic Finite Automaton) construction and simulation
//!
//! States live in an arena owned by the [`Nfa`]; Thompson fragments are
//! `(start, accept)` pairs of state ids composed with epsilon edges.
//! Repetitions reuse the fragment's own two end states instead of adding
//! new ones: `*` gets a back edge and a bypass, `+` only the back edge and
//! `?` only the bypass. That is only sound while nothing else enters the
//! start state or leaves the accepting one, so a fragment already wired
//! that way (`a*` inside `(?:a*b)*`) is first wrapped in two fresh states.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// An NFA state ID
pub type StateId = usize;

/// What a transition consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transition {
    /// Transition on a specific character
    Char(char),
    /// Epsilon transition (no input consumed)
    Epsilon,
}

/// An NFA state
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Target states per transition
    pub transitions: BTreeMap<Transition, BTreeSet<StateId>>,
    /// Whether this is an accepting state
    pub accepting: bool,
}

impl State {
    fn targets(&self, transition: Transition) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .get(&transition)
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }
}

/// A partial automaton under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Entry state
    pub start: StateId,
    /// Exit state
    pub accept: StateId,
}

/// One row of [`Nfa::transition_table`], in state numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfaRow {
    /// Targets per input char
    pub transitions: BTreeMap<char, Vec<usize>>,
    /// Direct epsilon targets
    pub epsilon: Vec<usize>,
    /// The state plus everything epsilon-reachable from it
    pub closure: Vec<usize>,
}

/// NFA transition table keyed by state number (depth-first, from 1)
pub type NfaTable = BTreeMap<usize, NfaRow>;

/// An NFA (Nondeterministic Finite Automaton)
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    /// An empty state arena to build fragments in
    pub fn new() -> Self {
        Nfa::default()
    }

    fn new_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn add_transition(&mut self, from: StateId, transition: Transition, to: StateId) {
        self.states[from]
            .transitions
            .entry(transition)
            .or_default()
            .insert(to);
    }

    fn fragment(&mut self, transition: Transition) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_transition(start, transition, accept);
        Fragment { start, accept }
    }

    /// Two states joined by `c`
    pub fn char(&mut self, c: char) -> Fragment {
        self.fragment(Transition::Char(c))
    }

    /// Two states joined by an epsilon edge: the empty string
    pub fn epsilon(&mut self) -> Fragment {
        self.fragment(Transition::Epsilon)
    }

    /// Concatenation, folding left to right
    pub fn concat(&mut self, fragments: Vec<Fragment>) -> Fragment {
        let mut fragments = fragments.into_iter();
        let Some(first) = fragments.next() else {
            return self.epsilon();
        };
        let mut result = first;
        for next in fragments {
            self.add_transition(result.accept, Transition::Epsilon, next.start);
            result.accept = next.accept;
        }
        result
    }

    /// Alternation: a shared entry branching into each fragment, each
    /// fragment joining a shared exit
    pub fn or(&mut self, fragments: Vec<Fragment>) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        for fragment in fragments {
            self.add_transition(start, Transition::Epsilon, fragment.start);
            self.add_transition(fragment.accept, Transition::Epsilon, accept);
        }
        Fragment { start, accept }
    }

    /// `fragment` itself if its ends are free to take repetition edges,
    /// otherwise the fragment between two new epsilon-linked states
    fn isolated(&mut self, fragment: Fragment) -> Fragment {
        let entered = self.states.iter().any(|state| {
            state
                .transitions
                .values()
                .any(|targets| targets.contains(&fragment.start))
        });
        let left = !self.states[fragment.accept].transitions.is_empty();
        if !entered && !left {
            return fragment;
        }
        let start = self.new_state();
        let accept = self.new_state();
        self.add_transition(start, Transition::Epsilon, fragment.start);
        self.add_transition(fragment.accept, Transition::Epsilon, accept);
        Fragment { start, accept }
    }

    /// Kleene star
    pub fn star(&mut self, fragment: Fragment) -> Fragment {
        let fragment = self.isolated(fragment);
        self.add_transition(fragment.accept, Transition::Epsilon, fragment.start);
        self.add_transition(fragment.start, Transition::Epsilon, fragment.accept);
        fragment
    }

    /// One or more
    pub fn plus(&mut self, fragment: Fragment) -> Fragment {
        let fragment = self.isolated(fragment);
        self.add_transition(fragment.accept, Transition::Epsilon, fragment.start);
        fragment
    }

    /// Zero or one
    pub fn optional(&mut self, fragment: Fragment) -> Fragment {
        let fragment = self.isolated(fragment);
        self.add_transition(fragment.start, Transition::Epsilon, fragment.accept);
        fragment
    }

    /// Close the automaton over `fragment`, whose exit becomes accepting
    pub fn finish(mut self, fragment: Fragment) -> Nfa {
        self.start = fragment.start;
        self.accept = fragment.accept;
        if let Some(state) = self.states.get_mut(fragment.accept) {
            state.accepting = true;
        }
        self
    }

    /// The start state
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The accepting state
    pub fn accept(&self) -> StateId {
        self.accept
    }

    /// All states
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Number of states
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Whether the automaton accepts the whole of `input`
    pub fn matches(&self, input: &str) -> bool {
        if self.states.is_empty() {
            return false;
        }
        let input: Vec<char> = input.chars().collect();
        self.matches_from(self.start, &input, &mut HashSet::new())
    }

    /// `visited` holds the states reached at this input position through
    /// epsilon edges only, which breaks epsilon cycles
    fn matches_from(&self, state: StateId, input: &[char], visited: &mut HashSet<StateId>) -> bool {
        if !visited.insert(state) {
            return false;
        }
        let current = &self.states[state];
        match input.split_first() {
            None => {
                if current.accepting {
                    return true;
                }
            }
            Some((&symbol, rest)) => {
                for next in current.targets(Transition::Char(symbol)) {
                    if self.matches_from(next, rest, &mut HashSet::new()) {
                        return true;
                    }
                }
            }
        }
        current
            .targets(Transition::Epsilon)
            .any(|next| self.matches_from(next, input, visited))
    }

    /// Every char some transition consumes
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|state| state.transitions.keys())
            .filter_map(|transition| match transition {
                Transition::Char(c) => Some(*c),
                Transition::Epsilon => None,
            })
            .collect()
    }

    /// State numbers in depth-first order from the start state, from 1
    fn numbering(&self) -> HashMap<StateId, usize> {
        let mut numbers = HashMap::new();
        if self.states.is_empty() {
            return numbers;
        }
        let mut stack = vec![self.start];
        while let Some(state) = stack.pop() {
            if numbers.contains_key(&state) {
                continue;
            }
            numbers.insert(state, numbers.len() + 1);
            let targets: Vec<StateId> = self.states[state]
                .transitions
                .values()
                .flat_map(|targets| targets.iter().copied())
                .collect();
            stack.extend(targets.into_iter().rev());
        }
        numbers
    }

    fn closure(&self, state: StateId) -> BTreeSet<StateId> {
        let mut closure = BTreeSet::from([state]);
        let mut queue = VecDeque::from([state]);
        while let Some(current) = queue.pop_front() {
            for next in self.states[current].targets(Transition::Epsilon) {
                if closure.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        closure
    }

    /// Transition table over state numbers, with epsilon closures
    pub fn transition_table(&self) -> NfaTable {
        let numbers = self.numbering();
        let number_all = |states: &mut dyn Iterator<Item = StateId>| {
            let mut out: Vec<usize> = states.filter_map(|s| numbers.get(&s).copied()).collect();
            out.sort_unstable();
            out
        };

        let mut table = NfaTable::new();
        for (&state, &number) in &numbers {
            let mut row = NfaRow::default();
            for (transition, targets) in &self.states[state].transitions {
                let targets = number_all(&mut targets.iter().copied());
                match transition {
                    Transition::Char(c) => {
                        row.transitions.insert(*c, targets);
                    }
                    Transition::Epsilon => row.epsilon = targets,
                }
            }
            row.closure = number_all(&mut self.closure(state).into_iter());
            table.insert(number, row);
        }
        table
    }

    /// Numbers of the accepting states
    pub fn accepting_state_numbers(&self) -> BTreeSet<usize> {
        self.numbering()
            .into_iter()
            .filter(|(state, _)| self.states[*state].accepting)
            .map(|(_, number)| number)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `ab*c` built by hand
    fn ab_star_c() -> Nfa {
        let mut nfa = Nfa::new();
        let a = nfa.char('a');
        let b = nfa.char('b');
        let b_star = nfa.star(b);
        let c = nfa.char('c');
        let whole = nfa.concat(vec![a, b_star, c]);
        nfa.finish(whole)
    }

    #[test]
    fn test_char_and_concat() {
        let nfa = ab_star_c();
        assert!(nfa.matches("ac"));
        assert!(nfa.matches("abbbc"));
        assert!(!nfa.matches("abd"));
        assert!(!nfa.matches("abc "));
        assert!(!nfa.matches(""));
    }

    #[test]
    fn test_or_plus_optional() {
        let mut nfa = Nfa::new();
        let x = nfa.char('x');
        let y = nfa.char('y');
        let either = nfa.or(vec![x, y]);
        let repeated = nfa.plus(either);
        let z = nfa.char('z');
        let maybe_z = nfa.optional(z);
        let whole = nfa.concat(vec![repeated, maybe_z]);
        let nfa = nfa.finish(whole);

        assert!(nfa.matches("x"));
        assert!(nfa.matches("yxyz"));
        assert!(!nfa.matches("z"));
        assert!(!nfa.matches("xzz"));
    }

    #[test]
    fn test_epsilon_cycles_terminate() {
        let mut nfa = Nfa::new();
        let empty = nfa.epsilon();
        let starred = nfa.star(empty);
        let starred = nfa.star(starred);
        let nfa = nfa.finish(starred);
        assert!(nfa.matches(""));
        assert!(!nfa.matches("a"));
    }

    #[test]
    fn test_nested_repetition_is_isolated() {
        // (?:a*b)*
        let mut nfa = Nfa::new();
        let a = nfa.char('a');
        let a_star = nfa.star(a);
        let b = nfa.char('b');
        let body = nfa.concat(vec![a_star, b]);
        let whole = nfa.star(body);
        let nfa = nfa.finish(whole);

        assert!(nfa.matches(""));
        assert!(nfa.matches("aabab"));
        assert!(!nfa.matches("a"));
        assert!(!nfa.matches("aba"));
    }

    #[test]
    fn test_fresh_fragments_keep_two_states() {
        let mut nfa = Nfa::new();
        let a = nfa.char('a');
        let starred = nfa.star(a);
        assert_eq!(starred, a);
        assert_eq!(nfa.state_count(), 2);
    }

    #[test]
    fn test_transition_table() {
        let mut nfa = Nfa::new();
        let a = nfa.char('a');
        let nfa = nfa.finish(a);
        let table = nfa.transition_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[&1].transitions[&'a'], vec![2]);
        assert_eq!(table[&1].closure, vec![1]);
        assert_eq!(nfa.accepting_state_numbers(), BTreeSet::from([2]));
        assert_eq!(nfa.alphabet(), BTreeSet::from(['a']));
    }

    #[test]
    fn test_closure_follows_epsilon_chains() {
        let nfa = ab_star_c();
        let table = nfa.transition_table();
        // after `a` comes an epsilon into `b*`, whose start bypasses to its exit
        let after_a = table[&1].transitions[&'a'][0];
        assert!(table[&after_a].closure.len() >= 4);
        assert_eq!(nfa.alphabet(), BTreeSet::from(['a', 'b', 'c']));
    }
}
