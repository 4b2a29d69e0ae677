//! The fortune catalog: which sticks exist in the cylinder and what is
//! written on them.
//!
//! A [`Fortune`] is immutable and lives for the whole program in the static
//! [`CATALOG`]. Drawing is a uniform pick over the catalog, see
//! [`FortuneCatalog::draw`].
//!
//! # Ranks
//!
//! From best to worst: 上上签, 上签, 中签, 中下签, 下签. A [`Rank`] displays
//! as its label and can be parsed back from it.
use std::{fmt, str::FromStr};

use bevy::prelude::Color;
#[cfg(feature = "debug")]
use bevy_inspector_egui::Inspectable;
use enum_map::Enum;

#[derive(Clone, PartialEq, Debug)]
pub enum ParseError {
    BadRank(String),
}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadRank(rank) => write!(f, "The rank {rank} is not a known rank"),
        }
    }
}
impl std::error::Error for ParseError {}

/// How lucky a stick is.
#[cfg_attr(feature = "debug", derive(Inspectable))]
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    /// 上上签
    Supreme,
    /// 上签
    Good,
    /// 中签
    Middling,
    /// 中下签
    Uneasy,
    /// 下签
    Poor,
}
impl Rank {
    pub fn label(self) -> &'static str {
        use Rank::*;
        match self {
            Supreme => "上上签",
            Good => "上签",
            Middling => "中签",
            Uneasy => "中下签",
            Poor => "下签",
        }
    }
    pub fn color(self) -> Color {
        use Rank::*;
        match self {
            Supreme => Color::rgb(0.85, 0.1, 0.1),
            Good => Color::rgb(0.8, 0.35, 0.05),
            Middling => Color::rgb(0.55, 0.35, 0.15),
            Uneasy => Color::rgb(0.35, 0.35, 0.4),
            Poor => Color::rgb(0.2, 0.2, 0.25),
        }
    }
}
impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
impl FromStr for Rank {
    type Err = ParseError;
    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Rank::*;
        match s.trim() {
            "上上签" | "上上" => Ok(Supreme), "上签" | "上" => Ok(Good),
            "中签" | "中" => Ok(Middling),    "中下签" | "中下" => Ok(Uneasy),
            "下签" | "下" => Ok(Poor),
            other => Err(ParseError::BadRank(other.to_owned())),
        }
    }
}

/// What is written on a stick. Lines of [`Fortune::poem`] are separated by
/// `'\n'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fortune {
    pub rank: Rank,
    pub poem: &'static str,
    pub meaning: &'static str,
}
impl Fortune {
    pub fn poem_lines(&self) -> impl Iterator<Item = &'static str> {
        self.poem.lines()
    }
}

macro_rules! fortunes {
    ($($rank:tt $poem:literal $meaning:literal |)*) => (
        [ $( Fortune { rank: fortunes!(@rank $rank), poem: $poem, meaning: $meaning } ,)* ]
    );
    (@rank ss) => (Rank::Supreme);
    (@rank s) => (Rank::Good);
    (@rank m) => (Rank::Middling);
    (@rank u) => (Rank::Uneasy);
    (@rank p) => (Rank::Poor);
}

#[rustfmt::skip]
pub static CATALOG: &[Fortune] = &fortunes![
    ss "鲲鹏展翅九万里，\n一朝乘风上青云。\n十年寒窗今日满，\n金榜题名天下闻。"
       "此签大吉。多年积累终有回报，时机已到，只管全力以赴，所求之事必能如愿。" |
    ss "春雷一声万物苏，\n枯木逢春又发枝。\n龙门一跃鳞甲化，\n从此青云步步高。"
       "否极泰来之象。先前的困顿即将过去，贵人相助，凡事顺遂，宜把握良机。" |
    ss "皓月当空照九州，\n清辉万里映高楼。\n功名自有天相助，\n稳坐钓台看潮头。"
       "心境澄明，胜券在握。保持平常心，稳扎稳打，成功水到渠成。" |
    ss "东方日出照乾坤，\n万道霞光映院门。\n所谋之事皆称意，\n喜报频传笑语温。"
       "旭日东升，诸事吉利。所求之事已有眉目，专注当下，好消息不远。" |
    s  "柳暗花明又一村，\n山重水复路犹存。\n但将心力勤耕作，\n自有秋来满仓囤。"
       "眼前虽有曲折，前路依然光明。勤勉耕耘，收获在望。" |
    s  "一帆风顺出江东，\n两岸青山送客行。\n莫道前程多险阻，\n东风自会助舟轻。"
       "运势顺畅，外力相助。心无旁骛，顺势而为，必能抵达彼岸。" |
    s  "寒梅傲雪吐清香，\n历尽风霜志更刚。\n守得云开见明月，\n终将好梦作文章。"
       "先苦后甜之签。过往的辛苦不会白费，坚持到底，终能如愿以偿。" |
    s  "蜂采百花酿蜜甜，\n辛勤不负艳阳天。\n一分耕耘一分获，\n满载而归在眼前。"
       "天道酬勤。付出与回报相称，保持当前的努力，成果即将显现。" |
    m  "半山烟雨半山晴，\n行人且住莫前行。\n待到雾散天开日，\n再整行装踏坦程。"
       "时运平平，宜稳不宜急。调整节奏，查漏补缺，待时机成熟再发力。" |
    m  "江上行舟遇逆风，\n摇橹虽慢亦向东。\n但得恒心不退却，\n终能泊岸见渔翁。"
       "进展虽慢，方向无误。贵在坚持，切莫半途而废。" |
    m  "田中禾苗正青青，\n未到秋时莫问收。\n日日浇灌勤看护，\n自然结实满枝头。"
       "尚在积累之时，不必急于求成。按部就班，收获自会到来。" |
    m  "石上栽花根未深，\n晨昏浇灌费精心。\n若能坚守三冬过，\n花开满树自成林。"
       "根基尚浅，需下苦功。夯实基础，耐心等待，终有开花结果之日。" |
    u  "浮云遮月暗无光，\n夜路崎岖需细量。\n且将灯火持在手，\n一步一步到家乡。"
       "目前略有阻滞，心绪易乱。不可好高骛远，踏实复习、步步为营方能转危为安。" |
    u  "独坐孤舟钓寒江，\n鱼儿不至费思量。\n换个水湾重下饵，\n未必空篓返家乡。"
       "方法或需调整。固执一法难有成效，适当变通，另辟蹊径，仍有所获。" |
    p  "秋风落叶满庭黄，\n孤雁南飞路正长。\n莫叹眼前多坎坷，\n冬尽春回又一场。"
       "此签运势低迷，但否极泰来。眼前挫折是磨炼，不可灰心，调整心态，来年可期。" |
    p  "大雪封山路不通，\n旅人暂且宿亭中。\n炉边温酒养精神，\n雪霁再行万里程。"
       "时机未到，强求无益。宜休养生息，积蓄力量，等待下一次机会。" |
];

/// The sticks in the cylinder.
pub struct FortuneCatalog {
    fortunes: &'static [Fortune],
}
impl Default for FortuneCatalog {
    fn default() -> Self {
        Self::new(CATALOG)
    }
}
impl FortuneCatalog {
    pub fn new(fortunes: &'static [Fortune]) -> Self {
        Self { fortunes }
    }
    pub fn len(&self) -> usize {
        self.fortunes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fortunes.is_empty()
    }
    /// Pick a fortune, each entry has the same chance of being picked.
    ///
    /// `None` only if the catalog is empty.
    pub fn draw(&self, rng: &fastrand::Rng) -> Option<&'static Fortune> {
        if self.fortunes.is_empty() {
            return None;
        }
        self.fortunes.get(rng.usize(..self.fortunes.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entries_are_complete() {
        assert!(!CATALOG.is_empty());
        for fortune in CATALOG {
            assert!(!fortune.rank.label().is_empty());
            assert!(!fortune.meaning.trim().is_empty());
            assert_eq!(fortune.poem_lines().count(), 4, "{}", fortune.poem);
            assert!(fortune.poem_lines().all(|line| !line.trim().is_empty()));
        }
    }

    #[test]
    fn rank_labels_parse_back() {
        macro_rules! rank_assert {
            ($($text:literal => $rank:ident),* $(,)?) => (
                $( assert_eq!($text.parse::<Rank>(), Ok(Rank::$rank)); )*
            )
        }
        rank_assert!(
            "上上签" => Supreme,
            "上签" => Good,
            " 中签 " => Middling,
            "中下" => Uneasy,
            "下签" => Poor,
        );
        for fortune in CATALOG {
            assert_eq!(fortune.rank.to_string().parse::<Rank>(), Ok(fortune.rank));
        }
        let bad = "大吉".parse::<Rank>();
        assert_eq!(bad, Err(ParseError::BadRank("大吉".to_owned())));
    }

    #[test]
    fn draw_is_uniform() {
        let catalog = FortuneCatalog::default();
        let rng = fastrand::Rng::with_seed(0x5eed);
        let draws = 40_000;
        let mut counts = vec![0usize; catalog.len()];
        for _ in 0..draws {
            let fortune = catalog.draw(&rng).unwrap();
            let index = CATALOG.iter().position(|f| std::ptr::eq(f, fortune)).unwrap();
            counts[index] += 1;
        }
        let expected = 1.0 / catalog.len() as f64;
        for count in counts {
            let frequency = count as f64 / draws as f64;
            assert!((frequency - expected).abs() < 0.01, "{frequency} vs {expected}");
        }
    }

    #[test]
    fn empty_catalog_draws_nothing() {
        let catalog = FortuneCatalog::new(&[]);
        assert!(catalog.is_empty());
        assert_eq!(catalog.draw(&fastrand::Rng::with_seed(1)), None);
    }
}
