use archivist_core::{DateRange, Datetime360};
use archivist_dates::{DateRangeCalculator, DateRangeError, FilenamePattern, Frequency};
use proptest::prelude::*;
use rstest::rstest;

fn ymd(y: i64, m: u32, d: u32) -> Datetime360 {
    Datetime360::from_ymd(y, m, d).expect("valid date")
}

fn files(table: &str, spans: &[(&str, &str)]) -> Vec<String> {
    spans
        .iter()
        .map(|(start, end)| {
            format!("/data/output/{table}/ua/ua_{table}_UKESM1-0-LL_ssp126_r1i1p1f2_gn_{start}-{end}.nc")
        })
        .collect()
}

#[rstest]
#[case::daily_decades(
    "day",
    Frequency::Day,
    &[("20000101", "20091230"), ("20100101", "20191230"), ("20200101", "20291230")],
    ymd(2000, 1, 1),
    ymd(2030, 1, 1),
)]
#[case::daily_single_decade(
    "day",
    Frequency::Day,
    &[("20000101", "20091230")],
    ymd(2000, 1, 1),
    ymd(2010, 1, 1),
)]
#[case::yearly(
    "Ayr",
    Frequency::Yr,
    &[("2015", "2025")],
    ymd(2015, 1, 1),
    ymd(2026, 1, 1),
)]
#[case::monthly(
    "Amon",
    Frequency::Mon,
    &[("205001", "205912"), ("206001", "206912")],
    ymd(2050, 1, 1),
    ymd(2070, 1, 1),
)]
#[case::six_hourly(
    "6hrPlevPt",
    Frequency::SixHrPt,
    &[("200001010000", "200912301800")],
    ymd(2000, 1, 1),
    ymd(2010, 1, 1),
)]
#[case::three_hourly(
    "3hr",
    Frequency::ThreeHr,
    &[("200001010130", "200412302230")],
    Datetime360::new(2000, 1, 1, 1, 30, 0).unwrap(),
    Datetime360::new(2005, 1, 1, 1, 30, 0).unwrap(),
)]
#[case::subhourly_twenty_minutes(
    "E1hr",
    Frequency::SubhrPt,
    &[("20000101000000", "20091230234000")],
    ymd(2000, 1, 1),
    ymd(2010, 1, 1),
)]
#[case::subhourly_sixty_minutes(
    "E1hr",
    Frequency::SubhrPt,
    &[("20000101000000", "20091230230000")],
    ymd(2000, 1, 1),
    ymd(2010, 1, 1),
)]
fn coverage_by_frequency(
    #[case] table: &str,
    #[case] frequency: Frequency,
    #[case] spans: &[(&str, &str)],
    #[case] start: Datetime360,
    #[case] end: Datetime360,
) {
    let calc = DateRangeCalculator::default();
    let range = calc
        .date_range(&files(table, spans), frequency)
        .expect("date range");
    assert_eq!(range, DateRange::new(start, end).unwrap());
}

#[test]
fn first_publication_scenario_range() {
    let calc = DateRangeCalculator::default();
    let range = calc
        .date_range(
            &files("day", &[("20010101", "20251230"), ("20260101", "20491230")]),
            Frequency::Day,
        )
        .expect("date range");
    assert_eq!(range.start, ymd(2001, 1, 1));
    assert_eq!(range.end, ymd(2050, 1, 1));
}

#[test]
fn subhourly_rollover_comes_from_last_file() {
    // 20-minute sampling: the last end stamp sits at :40.
    let calc = DateRangeCalculator::default();
    let range = calc
        .date_range(
            &files(
                "E1hr",
                &[
                    ("20000101000000", "20001230234000"),
                    ("20010101000000", "20011230234000"),
                ],
            ),
            Frequency::SubhrPt,
        )
        .expect("date range");
    assert_eq!(range.end, ymd(2002, 1, 1));
}

#[test]
fn custom_pattern_is_honoured() {
    let pattern = FilenamePattern::new(r"(?P<start_date>\d{8})_(?P<end_date>\d{8})\.pp$")
        .expect("pattern");
    let calc = DateRangeCalculator::new(pattern);
    let range = calc
        .date_range(&["run/19600101_19691230.pp"], Frequency::Day)
        .expect("date range");
    assert_eq!(range, DateRange::new(ymd(1960, 1, 1), ymd(1970, 1, 1)).unwrap());
}

#[test]
fn unknown_frequency_label_is_rejected() {
    let err = "2hr".parse::<Frequency>().unwrap_err();
    assert!(matches!(err, DateRangeError::UnknownFrequency(ref s) if s == "2hr"));
}

fn decade(start_year: i64) -> (String, String) {
    (
        format!("{start_year}0101"),
        format!("{}1230", start_year + 9),
    )
}

proptest! {
    #[test]
    fn range_is_independent_of_file_order(
        decades in proptest::collection::vec(0i64..40, 1..12),
        seed in any::<u64>(),
    ) {
        let spans: Vec<(String, String)> = decades.iter().map(|d| decade(1850 + d * 10)).collect();
        let refs: Vec<(&str, &str)> = spans.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let mut ordered = files("day", &refs);
        let calc = DateRangeCalculator::default();
        let expected = calc.date_range(&ordered, Frequency::Day).unwrap();

        // Deterministic shuffle driven by the seed.
        let len = ordered.len();
        let mut state = seed;
        for i in (1..len).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            ordered.swap(i, j);
        }
        prop_assert_eq!(calc.date_range(&ordered, Frequency::Day).unwrap(), expected);

        ordered.reverse();
        prop_assert_eq!(calc.date_range(&ordered, Frequency::Day).unwrap(), expected);
    }
}
