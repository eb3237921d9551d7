//! Random two-word nicknames used as session identities.
//! Format: adjective-noun (e.g., "calm-otter", "brisk-lantern").

use parley_types::chat::Identity;
use rand::prelude::IndexedRandom;

const ADJECTIVES: &[&str] = &[
    "able", "airy", "amber", "ample", "arid", "azure", "bold", "brave", "brisk", "bright",
    "broad", "calm", "clear", "clever", "cool", "cosy", "crisp", "curly", "daring", "deep",
    "dusty", "eager", "early", "easy", "fair", "fancy", "fast", "fierce", "fine", "fond",
    "frank", "fresh", "gentle", "giddy", "glad", "golden", "grand", "green", "happy", "hardy",
    "hazy", "honest", "humble", "icy", "jolly", "keen", "kind", "lively", "lucky", "mellow",
    "merry", "misty", "modest", "noble", "nimble", "odd", "plain", "polite", "proud", "quick",
    "quiet", "rapid", "rosy", "royal", "rusty", "sandy", "sharp", "shiny", "shy", "silent",
    "silly", "sleek", "slow", "smart", "snowy", "solid", "spry", "steady", "stormy", "sunny",
    "swift", "tall", "tame", "tidy", "tiny", "vast", "vivid", "warm", "wary", "wild",
    "windy", "wise", "witty", "young", "zany", "zesty",
];

const NOUNS: &[&str] = &[
    "anchor", "badger", "beacon", "bison", "bramble", "breeze", "brook", "canyon", "cedar",
    "comet", "coral", "crane", "cricket", "dune", "eagle", "ember", "falcon", "fern", "finch",
    "fjord", "forest", "fox", "gecko", "glacier", "gull", "harbor", "hawk", "heron", "hill",
    "island", "ivy", "jackal", "kestrel", "lagoon", "lantern", "lark", "lemur", "lichen",
    "lynx", "maple", "marsh", "meadow", "mesa", "mole", "moose", "moth", "newt", "oak",
    "ocelot", "orchid", "osprey", "otter", "owl", "panda", "pebble", "pelican", "pine",
    "plover", "pond", "puffin", "quail", "rabbit", "raven", "reef", "ridge", "river", "robin",
    "salmon", "sparrow", "spruce", "squid", "stone", "stork", "summit", "swan", "thistle",
    "thrush", "tiger", "toad", "trout", "tulip", "tundra", "valley", "viper", "walrus",
    "weasel", "willow", "wolf", "wren", "yak", "zebra",
];

/// Generate a random `adjective-noun` identity.
pub fn generate() -> Identity {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or(ADJECTIVES[0]);
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or(NOUNS[0]);
    Identity::new(format!("{adjective}-{noun}"))
}
