use super::card::Card;
use super::hand::Hand;
use rand::Rng;
use rand::rngs::SmallRng;

/// the complement of all Cards dealt so far.
/// random selection via ::draw() against a caller-owned rng,
/// so environments stay reproducible under a fixed seed.
#[derive(Debug, Clone, Copy)]
pub struct Deck(Hand);

impl Default for Deck {
    fn default() -> Self {
        Self(Hand::full())
    }
}

impl From<Deck> for Hand {
    fn from(deck: Deck) -> Self {
        deck.0
    }
}

impl Deck {
    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// remove a specific card from the deck
    pub fn remove(&mut self, card: Card) {
        self.0 = self.0.remove(card);
    }

    /// remove a uniformly random card from the deck
    pub fn draw(&mut self, rng: &mut SmallRng) -> Card {
        assert!(self.0.size() > 0);
        let i = rng.random_range(0..self.0.size());
        let card = self
            .0
            .into_iter()
            .nth(i)
            .expect("index within deck size");
        self.remove(card);
        card
    }

    /// remove n random cards from the deck
    pub fn deal(&mut self, n: usize, rng: &mut SmallRng) -> Hand {
        (0..n).map(|_| self.draw(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn exhaustive_draws() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let mut deck = Deck::default();
        let drawn = (0..52).map(|_| deck.draw(rng)).collect::<Hand>();
        assert_eq!(deck.size(), 0);
        assert_eq!(drawn, Hand::full());
    }

    #[test]
    fn disjoint_deals() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let mut deck = Deck::default();
        let a = deck.deal(10, rng);
        let b = deck.deal(10, rng);
        assert_eq!(a.size(), 10);
        assert_eq!(b.size(), 10);
        assert_eq!(a.union(b).size(), 20);
    }
}
