use rand::seq::SliceRandom;
use rand::Rng;

pub const QUOTES: [&str; 10] = [
    "The future belongs to those who believe in the beauty of their dreams. - Eleanor Roosevelt",
    "Education is the most powerful weapon which you can use to change the world. - Nelson Mandela",
    "The beautiful thing about learning is that no one can take it away from you. - B.B. King",
    "Don't let what you cannot do interfere with what you can do. - John Wooden",
    "Start where you are. Use what you have. Do what you can. - Arthur Ashe",
    "The only way to learn mathematics is to do mathematics. - Paul Halmos",
    "Quality education is the foundation of a better future. - Unknown",
    "Study not to know more but to know better. - Seneca",
    "Learning is a treasure that will follow its owner everywhere. - Chinese Proverb",
    "Push yourself, because no one else is going to do it for you. - Unknown",
];

pub fn random_quote<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUOTES.choose(rng).copied().unwrap_or(QUOTES[0])
}
