//! Word lists backing the fake values

pub(crate) const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit",
    "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
    "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt",
    "mollit", "anim", "id", "est", "laborum",
];

pub(crate) const WORDS: &[&str] = &[
    "account", "archive", "bridge", "budget", "channel", "circuit", "compass", "copper", "decimal",
    "delta", "engine", "export", "fabric", "harbor", "index", "kernel", "ledger", "matrix",
    "meadow", "monitor", "orbit", "panel", "pixel", "portal", "protocol", "quartz", "record",
    "river", "sensor", "signal", "summit", "system", "ticket", "timber", "vector", "voyage",
];

pub(crate) const FIRST_NAMES: &[&str] = &[
    "alessandro", "anna", "chiara", "davide", "elena", "federico", "francesca", "giorgio",
    "giulia", "luca", "marco", "martina", "matteo", "paola", "roberto", "sara", "simone", "valeria",
];

pub(crate) const LAST_NAMES: &[&str] = &[
    "bianchi", "bruno", "colombo", "conti", "costa", "esposito", "ferrari", "gallo", "greco",
    "marino", "ricci", "romano", "rossi", "russo", "villa",
];

pub(crate) const COMPANY_SUFFIXES: &[&str] = &["SpA", "Srl", "Group", "and Sons", "LLC", "Inc"];

pub(crate) const BUZZ_VERBS: &[&str] = &[
    "aggregate", "deliver", "empower", "enable", "engage", "expedite", "integrate", "leverage",
    "orchestrate", "streamline", "synergize", "transform",
];

pub(crate) const BUZZ_ADJECTIVES: &[&str] = &[
    "B2C", "cross-platform", "digital", "end-to-end", "integrated", "mission-critical", "real-time",
    "scalable", "seamless", "sticky", "user-centric", "vertical",
];

pub(crate) const BUZZ_NOUNS: &[&str] = &[
    "channels", "communities", "experiences", "infrastructures", "initiatives", "markets",
    "metrics", "platforms", "portals", "services", "solutions", "synergies",
];

pub(crate) const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];
