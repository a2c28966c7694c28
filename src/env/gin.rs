use super::Environment;
use super::Observation;
use super::View;
use crate::Position;
use crate::Utility;
use crate::cards::Card;
use crate::cards::Hand;
use crate::cards::Rank;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

pub const DRAW_STOCK: usize = 0;
pub const DRAW_UPCARD: usize = 1;
pub const KNOCK: usize = 54;

/// the most deadwood a hand may hold and still knock
const KNOCK_LIMIT: u32 = 10;
/// deadwood margin that maps to a full unit of reward
const SCALE: Utility = 25.;

/// heads-up gin rummy, knock-only variant: no layoffs, no gin or
/// undercut bonuses. reward is the signed deadwood margin scaled
/// to the unit interval. discard actions are 2 + the card id.
#[derive(Clone)]
pub struct GinRummy {
    rng: SmallRng,
    stock: Vec<Card>,
    discard: Vec<Card>,
    hands: [Hand; 2],
    turn: Position,
    drawing: bool,
    result: [Utility; 2],
    done: bool,
}

impl GinRummy {
    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(seats == 2, "gin-rummy is heads-up, got {} seats", seats);
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            stock: vec![],
            discard: vec![],
            hands: [Hand::empty(); 2],
            turn: 0,
            drawing: true,
            result: [0.; 2],
            done: false,
        };
        this.reset();
        Ok(this)
    }

    fn other(&self) -> Position {
        1 - self.turn
    }

    /// the cheapest discard to leave behind, by resulting deadwood
    fn shed(&self, seat: Position) -> (Card, u32) {
        self.hands[seat]
            .into_iter()
            .map(|card| (card, deadwood(self.hands[seat].remove(card))))
            .min_by_key(|(_, dw)| *dw)
            .expect("non-empty hand")
    }
}

/// gin card value: aces one, faces ten
fn value(card: Card) -> u32 {
    match card.rank() {
        Rank::Ace => 1,
        rank => rank.pips().min(10) as u32,
    }
}

/// minimal unmelded pip sum over all partitions of the hand into
/// sets (3-4 of a rank) and runs (3+ suited consecutive ranks).
/// exhaustive recursion; hands never exceed eleven cards.
pub fn deadwood(hand: Hand) -> u32 {
    let card = match hand.into_iter().next() {
        None => return 0,
        Some(c) => c,
    };
    let mut best = value(card) + deadwood(hand.remove(card));
    let mut melds: Vec<Vec<Card>> = vec![];
    // sets of the card's rank
    let mates = hand
        .into_iter()
        .filter(|c| c.rank() == card.rank())
        .collect::<Vec<_>>();
    if mates.len() == 3 {
        melds.push(mates.clone());
    }
    if mates.len() == 4 {
        melds.push(mates.clone());
        for drop in 1..4 {
            let mut set = mates.clone();
            set.remove(drop);
            melds.push(set);
        }
    }
    // runs climbing from the card's rank in its suit. aces are low
    // in gin, so an ace may only prefix a run through the two; the
    // ace sorts above the king here and is never the recursion head
    // of a multi-rank run itself.
    let mut run = vec![card];
    loop {
        let last = *run.last().expect("seeded with card");
        if last.rank() == Rank::Ace {
            break;
        }
        let next = Card::from((Rank::from(u8::from(last.rank()) + 1), last.suit()));
        if hand.contains(next) {
            run.push(next);
        } else {
            break;
        }
    }
    for len in 3..=run.len() {
        melds.push(run[..len].to_vec());
    }
    let ace = Card::from((Rank::Ace, card.suit()));
    if card.rank() == Rank::Two && hand.contains(ace) {
        for len in 2..=run.len() {
            let mut meld = vec![ace];
            meld.extend_from_slice(&run[..len]);
            melds.push(meld);
        }
    }
    for meld in melds {
        let rest = meld.iter().fold(hand, |h, c| h.remove(*c));
        best = best.min(deadwood(rest));
    }
    best
}

impl Environment for GinRummy {
    fn seats(&self) -> usize {
        2
    }
    fn actions(&self) -> usize {
        55
    }
    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
    fn reset(&mut self) {
        let mut deck = Hand::full().into_iter().collect::<Vec<_>>();
        deck.shuffle(&mut self.rng);
        self.hands = [
            deck.drain(..10).collect(),
            deck.drain(..10).collect(),
        ];
        self.discard = vec![deck.pop().expect("cards remain")];
        self.stock = deck;
        self.turn = 0;
        self.drawing = true;
        self.result = [0.; 2];
        self.done = false;
    }
    fn over(&self) -> bool {
        self.done
    }
    fn observe(&self) -> Observation {
        assert!(!self.done);
        let hand = self.hands[self.turn];
        let legal = if self.drawing {
            vec![DRAW_STOCK, DRAW_UPCARD]
        } else {
            let mut legal = hand
                .into_iter()
                .map(|card| 2 + u8::from(card) as usize)
                .collect::<Vec<_>>();
            if self.shed(self.turn).1 <= KNOCK_LIMIT {
                legal.push(KNOCK);
            }
            legal
        };
        Observation {
            seat: self.turn,
            key: format!(
                "{}|{}|{}",
                hand,
                self.discard.last().map(|c| c.to_string()).unwrap_or_default(),
                if self.drawing { 'd' } else { 'p' }
            ),
            legal,
            view: View::Gin {
                hand: hand.into_iter().collect(),
                upcard: self.discard.last().copied(),
                drawing: self.drawing,
            },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        match action {
            DRAW_STOCK if self.drawing => {
                let card = self.stock.pop().expect("stock checked on entry");
                self.hands[self.turn] = self.hands[self.turn].add(card);
                self.drawing = false;
            }
            DRAW_UPCARD if self.drawing => {
                let card = self.discard.pop().expect("upcard present");
                self.hands[self.turn] = self.hands[self.turn].add(card);
                self.drawing = false;
            }
            KNOCK if !self.drawing => {
                let (card, mine) = self.shed(self.turn);
                assert!(mine <= KNOCK_LIMIT);
                self.hands[self.turn] = self.hands[self.turn].remove(card);
                let theirs = deadwood(self.hands[self.other()]);
                let margin = (theirs as Utility - mine as Utility) / SCALE;
                self.result[self.turn] = margin.clamp(-1., 1.);
                self.result[self.other()] = -self.result[self.turn];
                self.done = true;
            }
            discard if !self.drawing && discard >= 2 && discard < 54 => {
                let card = Card::from((discard - 2) as u8);
                assert!(self.hands[self.turn].contains(card));
                self.hands[self.turn] = self.hands[self.turn].remove(card);
                self.discard.push(card);
                self.drawing = true;
                self.turn = self.other();
                if self.stock.len() <= 2 {
                    // dead hand, nobody scores
                    self.done = true;
                }
            }
            _ => panic!("illegal gin-rummy action: {}", action),
        }
    }
    fn payoffs(&self) -> Vec<Utility> {
        assert!(self.done);
        self.result.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melded_hands_have_no_deadwood() {
        // two runs and a set
        let hand = Hand::from("Ac 2c 3c 4c 7h 8h 9h Ks Kd Kh");
        assert_eq!(deadwood(hand), 0);
    }

    #[test]
    fn lone_cards_sum_their_pips() {
        let hand = Hand::from("Ac 5d Th Ks");
        assert_eq!(deadwood(hand), 1 + 5 + 10 + 10);
    }

    #[test]
    fn melds_never_overlap() {
        // the 7h can serve the run or the set, not both;
        // melding the set strands 5h 6h 2s for 13
        let hand = Hand::from("5h 6h 7h 7c 7d 2s");
        assert_eq!(deadwood(hand), 5 + 6 + 2);
    }

    #[test]
    fn rewards_are_zero_sum_and_bounded() {
        use rand::seq::IndexedRandom;
        let ref mut rng = SmallRng::seed_from_u64(7);
        for seed in 0..8 {
            let mut env = GinRummy::new(2, seed).unwrap();
            while !env.over() {
                let obs = env.observe();
                env.apply(*obs.legal.choose(rng).expect("legal action"));
            }
            let payoffs = env.payoffs();
            assert_eq!(payoffs[0] + payoffs[1], 0.);
            assert!(payoffs.iter().all(|p| p.abs() <= 1.));
        }
    }

    #[test]
    fn dead_stock_scores_zero() {
        use rand::seq::IndexedRandom;
        let ref mut rng = SmallRng::seed_from_u64(1);
        let mut env = GinRummy::new(2, 1).unwrap();
        while !env.over() {
            let obs = env.observe();
            // never knock so the stock can run dry
            let quiet = obs
                .legal
                .iter()
                .filter(|a| **a != KNOCK)
                .copied()
                .collect::<Vec<_>>();
            env.apply(*quiet.choose(rng).expect("non-knock action"));
        }
        assert_eq!(env.payoffs(), vec![0., 0.]);
    }
}
