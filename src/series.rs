//! Multi-year accumulation of zonal profiles.
//!
//! Products come either as monthly means or as 5-day records. Each record
//! contributes one profile (one value per row), and the series turns those
//! into monthly, annual and climatological means.

use {
    anyhow::{bail, ensure, Context, Result},
    chrono::{Datelike, Duration, NaiveDate},
    ndarray::{Array1, Array2, Array3},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, fmt, ops::RangeInclusive},
};

/// Time stamp of one record. Monthly means sit on the 15th of their month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordTime {
    date: NaiveDate,
    monthly: bool,
}

impl RecordTime {
    /// `day` 0 stands for the monthly mean of `year`-`month`
    pub fn new(year: u32, month: u32, day: u32) -> Result<Self> {
        let monthly = day == 0;
        let date = NaiveDate::from_ymd_opt(year as i32, month, if monthly { 15 } else { day })
            .with_context(|| format!("invalid date {}-{:02}-{:02}", year, month, day))?;

        Ok(RecordTime { date, monthly })
    }

    pub fn monthly(year: u32, month: u32) -> Result<Self> {
        Self::new(year, month, 0)
    }

    pub fn is_monthly(&self) -> bool {
        self.monthly
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> u32 {
        self.date.year() as u32
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Day of month, 0 for monthly means
    pub fn day(&self) -> u32 {
        if self.monthly {
            0
        } else {
            self.date.day()
        }
    }

    /// The monthly record of the month this record falls in
    pub fn month_record(&self) -> RecordTime {
        RecordTime {
            date: self.date + Duration::days(15 - self.date.day() as i64),
            monthly: true,
        }
    }

    /// Seconds from `self` to `later`
    pub fn seconds_until(&self, later: &RecordTime) -> f64 {
        (later.date - self.date).num_seconds() as f64
    }
}

impl fmt::Display for RecordTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year(), self.month(), self.day())
    }
}

/// Record times of a product between two years, `per_month` records each
/// month. Six records per month stand for the 5-day products, which are
/// stamped on days 1, 6, 11, 16, 21 and 26.
pub fn record_times(years: RangeInclusive<u32>, per_month: u32) -> Result<Vec<RecordTime>> {
    let days = match per_month {
        1 => vec![0],
        6 => vec![1, 6, 11, 16, 21, 26],
        n => bail!("unsupported number of records per month: {}", n),
    };

    let mut times = vec![];
    for year in years {
        for month in 1..=12 {
            for &day in &days {
                times.push(RecordTime::new(year, month, day)?);
            }
        }
    }

    Ok(times)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    records: BTreeMap<RecordTime, Array1<f64>>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: RecordTime, profile: Array1<f64>) -> Result<()> {
        if let Some(width) = self.width() {
            ensure!(
                profile.len() == width,
                "profile at {} has {} rows, series has {}",
                time,
                profile.len(),
                width
            );
        }
        ensure!(
            !self.records.contains_key(&time),
            "duplicate record at {}",
            time
        );

        self.records.insert(time, profile);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows in each profile
    pub fn width(&self) -> Option<usize> {
        self.records.values().next().map(|p| p.len())
    }

    pub fn get(&self, time: &RecordTime) -> Option<&Array1<f64>> {
        self.records.get(time)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordTime, &Array1<f64>)> {
        self.records.iter()
    }

    /// Mean over every record
    pub fn mean(&self) -> Option<Array1<f64>> {
        mean(self.records.values())
    }

    /// Averages all records of each calendar month into one monthly record
    pub fn monthly_means(&self) -> Series {
        let mut groups = BTreeMap::<RecordTime, Vec<&Array1<f64>>>::new();
        for (time, profile) in &self.records {
            groups.entry(time.month_record()).or_default().push(profile);
        }

        let records = groups
            .into_iter()
            .filter_map(|(time, profiles)| mean(profiles.into_iter()).map(|p| (time, p)))
            .collect();

        Series { records }
    }

    /// Mean of the monthly means of each year
    pub fn annual_means(&self) -> BTreeMap<u32, Array1<f64>> {
        let mut groups = BTreeMap::<u32, Vec<Array1<f64>>>::new();
        for (time, profile) in self.monthly_means().records {
            groups.entry(time.year()).or_default().push(profile);
        }

        groups
            .into_iter()
            .filter_map(|(year, profiles)| mean(profiles.iter()).map(|p| (year, p)))
            .collect()
    }

    /// Mean seasonal cycle, `[12, rows]`. Months without data are NaN.
    pub fn climatology(&self) -> Array2<f64> {
        let width = self.width().unwrap_or(0);
        let mut groups = vec![vec![]; 12];
        for (time, profile) in self.monthly_means().records {
            groups[time.month() as usize - 1].push(profile);
        }

        let mut out = Array2::from_elem((12, width), f64::NAN);
        for (month, profiles) in groups.iter().enumerate() {
            if let Some(p) = mean(profiles.iter()) {
                out.row_mut(month).assign(&p);
            }
        }

        out
    }

    /// Monthly means laid out `[year, month, rows]`, NaN where missing
    pub fn to_array(&self, years: RangeInclusive<u32>) -> Array3<f64> {
        let first = *years.start();
        let nyears = years.clone().count();
        let width = self.width().unwrap_or(0);

        let mut out = Array3::from_elem((nyears, 12, width), f64::NAN);
        for (time, profile) in self.monthly_means().records {
            if years.contains(&time.year()) {
                let (y, m) = ((time.year() - first) as usize, time.month() as usize - 1);
                out.slice_mut(ndarray::s![y, m, ..]).assign(&profile);
            }
        }

        out
    }
}

fn mean<'a, I: Iterator<Item = &'a Array1<f64>>>(profiles: I) -> Option<Array1<f64>> {
    let mut count = 0;
    let mut sum: Option<Array1<f64>> = None;

    for p in profiles {
        count += 1;
        sum = Some(match sum {
            Some(s) => s + p,
            None => p.clone(),
        });
    }

    sum.map(|s| s / count as f64)
}

#[cfg(test)]
mod test {
    use {super::*, crate::utils::assert_approx_eq_slice, ndarray::array};

    #[test]
    fn five_day_records_average_into_months() {
        let mut series = Series::new();
        for (n, time) in record_times(2000..=2000, 6).unwrap().into_iter().enumerate() {
            series.push(time, array![n as f64, 1.0]).unwrap();
        }

        assert_eq!(72, series.len());

        let monthly = series.monthly_means();
        assert_eq!(12, monthly.len());

        let january = monthly.get(&RecordTime::monthly(2000, 1).unwrap()).unwrap();
        assert_approx_eq_slice(&[2.5, 1.0], january.as_slice().unwrap(), 1.0E-12);
    }

    #[test]
    fn climatology_and_missing_months() {
        let mut series = Series::new();
        series
            .push(RecordTime::monthly(1990, 3).unwrap(), array![1.0])
            .unwrap();
        series
            .push(RecordTime::monthly(1991, 3).unwrap(), array![3.0])
            .unwrap();
        series
            .push(RecordTime::monthly(1991, 4).unwrap(), array![5.0])
            .unwrap();

        let climatology = series.climatology();
        assert_eq!(2.0, climatology[[2, 0]]);
        assert_eq!(5.0, climatology[[3, 0]]);
        assert!(climatology[[0, 0]].is_nan());

        let annual = series.annual_means();
        assert_eq!(array![1.0], annual[&1990]);
        assert_eq!(array![4.0], annual[&1991]);

        let layout = series.to_array(1990..=1992);
        assert_eq!((3, 12, 1), layout.dim());
        assert_eq!(3.0, layout[[1, 2, 0]]);
        assert!(layout[[2, 2, 0]].is_nan());
    }

    #[test]
    fn rejects_inconsistent_records() {
        let mut series = Series::new();
        let time = RecordTime::monthly(2001, 7).unwrap();
        series.push(time, array![1.0, 2.0]).unwrap();

        assert!(series.push(time, array![1.0, 2.0]).is_err());
        assert!(series
            .push(RecordTime::monthly(2001, 8).unwrap(), array![1.0])
            .is_err());
    }

    #[test]
    fn calendar() {
        assert!(RecordTime::new(2001, 2, 29).is_err());
        assert!(RecordTime::new(2004, 2, 29).is_ok());
        assert!(RecordTime::new(2004, 13, 1).is_err());

        assert!(RecordTime::new(2004, 4, 31).is_err());

        let day = RecordTime::new(2004, 2, 29).unwrap();
        assert!(!day.is_monthly());
        assert_eq!((2004, 2, 29), (day.year(), day.month(), day.day()));
        assert_eq!(RecordTime::monthly(2004, 2).unwrap(), day.month_record());
        assert_eq!(NaiveDate::from_ymd_opt(2004, 2, 15), Some(day.month_record().date()));

        assert_eq!(
            31.0 * 86_400.0,
            RecordTime::monthly(2000, 1)
                .unwrap()
                .seconds_until(&RecordTime::monthly(2000, 2).unwrap())
        );
        assert_eq!(
            "20000106",
            RecordTime::new(2000, 1, 6).unwrap().to_string()
        );
        assert_eq!("20000100", RecordTime::monthly(2000, 1).unwrap().to_string());
        assert_eq!(
            -5.0 * 86_400.0,
            RecordTime::new(2000, 3, 1)
                .unwrap()
                .seconds_until(&RecordTime::new(2000, 2, 25).unwrap())
        );
        assert!(record_times(2000..=2000, 4).is_err());
    }
}
