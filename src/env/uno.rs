use super::Environment;
use super::Observation;
use super::View;
use crate::Position;
use crate::Utility;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

pub const DRAW: usize = 60;

/// faces 0-9 are numbers; the rest are effects
pub const SKIP: u8 = 10;
pub const REVERSE: u8 = 11;
pub const DRAW_TWO: u8 = 12;
pub const WILD: u8 = 13;
pub const WILD_FOUR: u8 = 14;

/// hands stall out at this many plies and score zero
const MAX_PLIES: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Color {
    pub const fn all() -> [Self; 4] {
        [Self::Red, Self::Green, Self::Blue, Self::Yellow]
    }
}
impl From<Color> for usize {
    fn from(c: Color) -> usize {
        match c {
            Color::Red => 0,
            Color::Green => 1,
            Color::Blue => 2,
            Color::Yellow => 3,
        }
    }
}
impl From<usize> for Color {
    fn from(n: usize) -> Self {
        Self::all()[n % 4]
    }
}

/// wilds carry no color until played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnoCard {
    pub color: Option<Color>,
    pub face: u8,
}

/// action ids: 52 colored plays (color * 13 + face), 4 wild color
/// declarations, 4 wild-draw-four declarations, and draw.
impl UnoCard {
    pub fn action(&self, declared: Color) -> usize {
        match (self.color, self.face) {
            (Some(c), f) if f < WILD => usize::from(c) * 13 + f as usize,
            (None, WILD) => 52 + usize::from(declared),
            (None, WILD_FOUR) => 56 + usize::from(declared),
            _ => panic!("malformed uno card {:?}", self),
        }
    }
}

/// the 2-4 player shedding game over the standard 108-card deck.
/// skips, reverses, and draw penalties resolve immediately; first
/// empty hand wins outright.
#[derive(Clone)]
pub struct Uno {
    rng: SmallRng,
    seats: usize,
    hands: Vec<Vec<UnoCard>>,
    pile: Vec<UnoCard>,
    discard: Vec<UnoCard>,
    top: UnoCard,
    color: Color,
    clockwise: bool,
    turn: Position,
    plies: usize,
    winner: Option<Position>,
    done: bool,
}

impl Uno {
    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!((2..=4).contains(&seats), "uno seats 2..=4, got {}", seats);
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            seats,
            hands: vec![],
            pile: vec![],
            discard: vec![],
            top: UnoCard {
                color: Some(Color::Red),
                face: 0,
            },
            color: Color::Red,
            clockwise: true,
            turn: 0,
            plies: 0,
            winner: None,
            done: false,
        };
        this.reset();
        Ok(this)
    }

    /// one zero and two of everything else per color, plus 4 + 4 wilds
    fn full_deck() -> Vec<UnoCard> {
        let mut deck = vec![];
        for color in Color::all() {
            deck.push(UnoCard {
                color: Some(color),
                face: 0,
            });
            for face in 1..=DRAW_TWO {
                for _ in 0..2 {
                    deck.push(UnoCard {
                        color: Some(color),
                        face,
                    });
                }
            }
        }
        for _ in 0..4 {
            deck.push(UnoCard {
                color: None,
                face: WILD,
            });
            deck.push(UnoCard {
                color: None,
                face: WILD_FOUR,
            });
        }
        deck
    }

    fn playable(&self, card: &UnoCard) -> bool {
        match card.color {
            None => true,
            Some(c) => c == self.color || card.face == self.top.face,
        }
    }

    fn next(&self, from: Position) -> Position {
        if self.clockwise {
            (from + 1) % self.seats
        } else {
            (from + self.seats - 1) % self.seats
        }
    }

    /// move n cards from pile to the given hand, recycling the
    /// discard when the pile runs dry
    fn penalize(&mut self, seat: Position, n: usize) {
        for _ in 0..n {
            if self.pile.is_empty() {
                self.pile.append(&mut self.discard);
                self.pile.shuffle(&mut self.rng);
            }
            match self.pile.pop() {
                Some(card) => self.hands[seat].push(card),
                None => break,
            }
        }
    }

    fn shed(&mut self, index: usize, declared: Color) {
        let card = self.hands[self.turn].remove(index);
        self.discard.push(self.top);
        self.color = card.color.unwrap_or(declared);
        self.top = card;
        if self.hands[self.turn].is_empty() {
            self.winner = Some(self.turn);
            self.done = true;
            return;
        }
        let next = self.next(self.turn);
        match card.face {
            SKIP => self.turn = self.next(next),
            REVERSE => {
                self.clockwise = !self.clockwise;
                self.turn = match self.seats {
                    2 => self.turn, // acts as a skip heads-up
                    _ => self.next(self.turn),
                };
            }
            DRAW_TWO => {
                self.penalize(next, 2);
                self.turn = self.next(next);
            }
            WILD_FOUR => {
                self.penalize(next, 4);
                self.turn = self.next(next);
            }
            _ => self.turn = next,
        }
    }
}

impl Environment for Uno {
    fn seats(&self) -> usize {
        self.seats
    }
    fn actions(&self) -> usize {
        61
    }
    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
    fn reset(&mut self) {
        let mut deck = Self::full_deck();
        deck.shuffle(&mut self.rng);
        self.hands = (0..self.seats)
            .map(|_| (0..7).map(|_| deck.pop().expect("fresh deck")).collect())
            .collect();
        // flip until a number card starts the discard
        loop {
            let card = deck.pop().expect("numbers outnumber effects");
            if card.color.is_some() && card.face < SKIP {
                self.color = card.color.expect("colored");
                self.top = card;
                break;
            }
            deck.insert(0, card);
        }
        self.pile = deck;
        self.discard = vec![];
        self.clockwise = true;
        self.turn = 0;
        self.plies = 0;
        self.winner = None;
        self.done = false;
    }
    fn over(&self) -> bool {
        self.done
    }
    fn observe(&self) -> Observation {
        assert!(!self.done);
        let hand = &self.hands[self.turn];
        let mut legal = hand
            .iter()
            .filter(|card| self.playable(card))
            .flat_map(|card| match card.color {
                Some(_) => vec![card.action(self.color)],
                None => Color::all().iter().map(|c| card.action(*c)).collect(),
            })
            .collect::<Vec<_>>();
        if legal.is_empty() {
            legal.push(DRAW);
        }
        legal.sort_unstable();
        legal.dedup();
        let mut held = hand
            .iter()
            .map(|card| card.action(Color::Red))
            .collect::<Vec<_>>();
        held.sort_unstable();
        Observation {
            seat: self.turn,
            key: format!("{:?}|{}", held, self.top.action(self.color)),
            legal,
            view: View::Uno {
                hand: hand.clone(),
                top: self.top,
                color: self.color,
            },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        self.plies += 1;
        if self.plies >= MAX_PLIES {
            self.done = true;
            return;
        }
        match action {
            DRAW => {
                self.penalize(self.turn, 1);
                self.turn = self.next(self.turn);
            }
            a if a < 52 => {
                let color = Color::from(a / 13);
                let face = (a % 13) as u8;
                let index = self.hands[self.turn]
                    .iter()
                    .position(|c| c.color == Some(color) && c.face == face)
                    .expect("played card held");
                assert!(color == self.color || face == self.top.face);
                self.shed(index, self.color);
            }
            a if a < 60 => {
                let face = if a < 56 { WILD } else { WILD_FOUR };
                let declared = Color::from(a % 4);
                let index = self.hands[self.turn]
                    .iter()
                    .position(|c| c.color.is_none() && c.face == face)
                    .expect("played wild held");
                self.shed(index, declared);
            }
            _ => panic!("illegal uno action: {}", action),
        }
    }
    fn payoffs(&self) -> Vec<Utility> {
        assert!(self.done);
        match self.winner {
            None => vec![0.; self.seats],
            Some(w) => {
                let mut payoffs = vec![-1.; self.seats];
                payoffs[w] = 1.;
                payoffs
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck_is_108() {
        assert_eq!(Uno::full_deck().len(), 108);
    }

    #[test]
    fn action_ids_cover_space() {
        let wild = UnoCard {
            color: None,
            face: WILD,
        };
        let wild4 = UnoCard {
            color: None,
            face: WILD_FOUR,
        };
        assert_eq!(wild.action(Color::Red), 52);
        assert_eq!(wild4.action(Color::Yellow), 59);
        let nine = UnoCard {
            color: Some(Color::Yellow),
            face: 9,
        };
        assert_eq!(nine.action(Color::Red), 48);
    }

    #[test]
    fn draw_is_fallback_only() {
        let mut env = Uno::new(2, 9).unwrap();
        for _ in 0..50 {
            if env.over() {
                break;
            }
            let obs = env.observe();
            if obs.legal.contains(&DRAW) {
                assert_eq!(obs.legal, vec![DRAW]);
            }
            env.apply(obs.legal[0]);
        }
    }

    #[test]
    fn winner_empties_hand() {
        use rand::seq::IndexedRandom;
        let ref mut rng = SmallRng::seed_from_u64(0);
        let mut env = Uno::new(3, 10).unwrap();
        while !env.over() {
            let obs = env.observe();
            env.apply(*obs.legal.choose(rng).expect("non-empty"));
        }
        if let Some(w) = env.winner {
            assert!(env.hands[w].is_empty());
            assert_eq!(env.payoffs()[w], 1.);
        }
    }
}
