#[derive(Clone, Debug)]
pub(crate) struct StatusInfo {
    pub(crate) speed: f32,
    pub(crate) stars: usize,
    pub(crate) trails: bool,
    pub(crate) color: bool,
    pub(crate) paused: bool,
    pub(crate) warp_left: Option<u32>,
    pub(crate) live_trails: usize,
}

const SEP: &str = " | ";
const LEGEND_SEP: &str = "  ";

const SHORT_LEGEND: [&str; 9] = [
    "Q quit",
    "Space pause",
    "↑↓ speed",
    "←→ stars",
    "T trails",
    "C color",
    "W warp",
    "R reset",
    "1-5 presets",
];

const FULL_LEGEND: [&str; 9] = [
    "↑/↓ speed",
    "←/→ density",
    "1-5 density presets",
    "T trails",
    "C color",
    "W warp",
    "R reset",
    "Space pause",
    "Q quit",
];

fn on_off(v: bool) -> &'static str {
    if v {
        "ON"
    } else {
        "OFF"
    }
}

fn run_state(info: &StatusInfo) -> String {
    match (info.paused, info.warp_left) {
        (true, Some(n)) => format!("Paused (warp {n})"),
        (true, None) => "Paused".to_string(),
        (false, Some(n)) => format!("WARP {n}"),
        (false, None) => "Running".to_string(),
    }
}

// tokens are shown whole or dropped, never cut
fn fit<S: AsRef<str>>(tokens: &[S], sep: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for tok in tokens {
        let tok = tok.as_ref();
        let extra = if out.is_empty() { 0 } else { sep.chars().count() };
        let n = tok.chars().count();
        if used + extra + n > width {
            break;
        }
        if extra > 0 {
            out.push_str(sep);
        }
        out.push_str(tok);
        used += extra + n;
    }
    out
}

pub(crate) fn status_lines(info: &StatusInfo, width: u16) -> Vec<String> {
    let w = width as usize;

    if w < 40 {
        let tokens = [format!("Spd {:.3}", info.speed), format!("Stars {}", info.stars)];
        return vec![fit(&tokens, SEP, w)];
    }
    if w < 60 {
        let tokens = [
            format!("Spd {:.3}", info.speed),
            format!("Stars {}", info.stars),
            run_state(info),
        ];
        return vec![fit(&tokens, SEP, w)];
    }
    if w < 80 {
        let tokens = [
            format!("Speed: {:.3}", info.speed),
            format!("Stars: {}", info.stars),
            run_state(info),
            "Q quit  Space pause".to_string(),
        ];
        return vec![fit(&tokens, SEP, w)];
    }
    if w < 120 {
        let tokens = [
            format!("Speed: {:.3}", info.speed),
            format!("Stars: {}", info.stars),
            format!("Trails: {}", on_off(info.trails)),
            format!("Color: {}", on_off(info.color)),
            run_state(info),
        ];
        return vec![fit(&tokens, SEP, w), fit(&SHORT_LEGEND, LEGEND_SEP, w)];
    }

    let tokens = [
        format!("Speed: {:.3}", info.speed),
        format!("Stars: {}", info.stars),
        format!("Trails: {} ({} live)", on_off(info.trails), info.live_trails),
        format!("Color: {}", on_off(info.color)),
        run_state(info),
    ];
    let mut legend = vec!["Controls:"];
    legend.extend(FULL_LEGEND);
    vec![fit(&tokens, SEP, w), fit(&legend, LEGEND_SEP, w)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> StatusInfo {
        StatusInfo {
            speed: 0.02,
            stars: 200,
            trails: true,
            color: false,
            paused: false,
            warp_left: None,
            live_trails: 17,
        }
    }

    #[test]
    fn narrow_shows_speed_and_count_only() {
        let lines = status_lines(&info(), 30);
        assert_eq!(lines, vec!["Spd 0.020 | Stars 200".to_string()]);
    }

    #[test]
    fn adds_run_state_below_sixty() {
        let lines = status_lines(&info(), 50);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("Running"));
    }

    #[test]
    fn adds_hint_below_eighty() {
        let mut i = info();
        i.paused = true;
        let lines = status_lines(&i, 70);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Paused"));
        assert!(lines[0].contains("Q quit"));
    }

    #[test]
    fn medium_splits_state_and_legend() {
        let lines = status_lines(&info(), 100);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Trails: ON"));
        assert!(lines[0].contains("Color: OFF"));
        assert!(lines[1].starts_with("Q quit"));
    }

    #[test]
    fn wide_shows_everything() {
        let mut i = info();
        i.warp_left = Some(42);
        let lines = status_lines(&i, 140);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("(17 live)"));
        assert!(lines[0].contains("WARP 42"));
        assert!(lines[1].starts_with("Controls:"));
        assert!(lines[1].ends_with("Q quit"));
    }

    #[test]
    fn lines_never_exceed_width() {
        let mut i = info();
        i.paused = true;
        i.warp_left = Some(1000);
        i.stars = 500;
        for w in 0..200u16 {
            for line in status_lines(&i, w) {
                assert!(line.chars().count() <= w as usize, "width {w}: {line:?}");
            }
        }
    }

    #[test]
    fn tokens_are_dropped_whole() {
        // "Spd 0.020" is 9 wide, the next token would not fit in 12
        assert_eq!(status_lines(&info(), 12), vec!["Spd 0.020".to_string()]);
        assert_eq!(status_lines(&info(), 5), vec![String::new()]);
    }
}
