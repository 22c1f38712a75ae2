use crate::models::{MediaRef, MediaType};

/// Client-side destinations the core can ask the shell to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    MovieDetail(u64),
    TvDetail(u64),
    Person(u64),
    Collection(u64),
    Watch(MediaRef),
}

impl Route {
    pub fn detail(media_type: MediaType, media_id: u64) -> Self {
        match media_type {
            MediaType::Movie => Route::MovieDetail(media_id),
            MediaType::Tv => Route::TvDetail(media_id),
        }
    }

    pub fn watch(media_ref: MediaRef) -> Self {
        Route::Watch(media_ref)
    }

    /// Canonical client-side path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::MovieDetail(id) => format!("/movie/{}", id),
            Route::TvDetail(id) => format!("/tv/{}", id),
            Route::Person(id) => format!("/person/{}", id),
            Route::Collection(id) => format!("/collection/{}", id),
            Route::Watch(media_ref) => match (media_ref.media_type, media_ref.season, media_ref.episode)
            {
                (MediaType::Tv, Some(season), Some(episode)) => {
                    format!("/watch/tv/{}/{}/{}", media_ref.media_id, season, episode)
                }
                (MediaType::Tv, _, _) => format!("/watch/tv/{}/1/1", media_ref.media_id),
                (MediaType::Movie, _, _) => format!("/watch/movie/{}", media_ref.media_id),
            },
        }
    }
}

/// Short-link code for a detail route: a type character followed by the id
/// in base 36 (`m` movie, `t` tv, `p` person, `c` collection).
pub fn encode_short_link(route: &Route) -> Option<String> {
    let (type_char, id) = match route {
        Route::MovieDetail(id) => ('m', *id),
        Route::TvDetail(id) => ('t', *id),
        Route::Person(id) => ('p', *id),
        Route::Collection(id) => ('c', *id),
        _ => return None,
    };
    Some(format!("{}{}", type_char, to_base36(id)))
}

/// Resolve a short-link code to its canonical route. Resolution is total:
/// malformed codes land on `Home`.
pub fn resolve_short_link(code: &str) -> Route {
    let mut chars = code.chars();
    let Some(type_char) = chars.next() else {
        return Route::Home;
    };
    let rest = chars.as_str();
    if rest.is_empty() {
        return Route::Home;
    }
    let Ok(id) = u64::from_str_radix(rest, 36) else {
        return Route::Home;
    };

    match type_char {
        'm' => Route::MovieDetail(id),
        't' => Route::TvDetail(id),
        'p' => Route::Person(id),
        'c' => Route::Collection(id),
        _ => Route::Home,
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}
