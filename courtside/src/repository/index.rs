use crate::models::{PlayerId, PlayerIndexEntry};

/// Upper bound on the number of candidates a name search returns.
pub const SEARCH_LIMIT: usize = 10;

/// Case- and accent-insensitive lookup over the static player list.
#[derive(Debug, Clone, Default)]
pub struct PlayerIndex {
    entries: Vec<IndexedName>,
}

#[derive(Debug, Clone)]
struct IndexedName {
    key: String,
    entry: PlayerIndexEntry,
}

impl PlayerIndex {
    pub fn new(entries: Vec<PlayerIndexEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|entry| !entry.full_name.trim().is_empty())
            .map(|entry| IndexedName {
                key: fold_name(&entry.full_name),
                entry,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerIndexEntry> {
        self.entries
            .iter()
            .map(|indexed| &indexed.entry)
            .find(|entry| entry.id == id)
    }

    /// Exact (folded) full-name match.
    pub fn exact(&self, name: &str) -> Option<&PlayerIndexEntry> {
        let key = fold_name(name);
        if key.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|indexed| indexed.key == key)
            .map(|indexed| &indexed.entry)
    }

    /// Best single candidate for `name`.
    ///
    /// An exact match wins. Otherwise either string containing the other
    /// counts as a match, and active players rank ahead of retired ones.
    pub fn best_match(&self, name: &str) -> Option<&PlayerIndexEntry> {
        if let Some(entry) = self.exact(name) {
            return Some(entry);
        }
        self.ranked(name, Containment::Either).into_iter().next()
    }

    /// Up to [`SEARCH_LIMIT`] candidates whose name contains `text`.
    pub fn search(&self, text: &str) -> Vec<&PlayerIndexEntry> {
        let mut matches = self.ranked(text, Containment::NameHoldsQuery);
        matches.truncate(SEARCH_LIMIT);
        matches
    }

    fn ranked(&self, text: &str, containment: Containment) -> Vec<&PlayerIndexEntry> {
        let needle = fold_name(text);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(u8, &PlayerIndexEntry)> = self
            .entries
            .iter()
            .filter_map(|indexed| {
                let rank = if indexed.key == needle {
                    0
                } else if containment.accepts(&indexed.key, &needle) {
                    if indexed.entry.is_active {
                        1
                    } else {
                        2
                    }
                } else {
                    return None;
                };
                Some((rank, &indexed.entry))
            })
            .collect();

        // Stable: ties keep index order.
        matches.sort_by_key(|(rank, _)| *rank);
        matches.into_iter().map(|(_, entry)| entry).collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Containment {
    /// The indexed name contains the query.
    NameHoldsQuery,
    /// Either string contains the other.
    Either,
}

impl Containment {
    fn accepts(self, key: &str, needle: &str) -> bool {
        match self {
            Containment::NameHoldsQuery => key.contains(needle),
            Containment::Either => key.contains(needle) || needle.contains(key),
        }
    }
}

/// Lowercase, collapse whitespace and strip the diacritics that show up in
/// player names, so "Nikola Jokic" finds "Nikola Jokić".
pub fn fold_name(name: &str) -> String {
    let folded: String = name.chars().flat_map(char::to_lowercase).map(fold_char).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'đ' | 'ď' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ě' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' => 's',
        'ť' | 'ţ' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
