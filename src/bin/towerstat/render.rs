use std::{collections::BTreeSet, io::Write};
use towerstat::{ChannelId, GustRow, MinuteMean, SnapshotMatrix, Tower, MISSING};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub(crate) fn channel_list<W: Write>(out: &mut W, channels: &[ChannelId]) -> std::io::Result<()> {
    for channel in channels {
        writeln!(out, "{:<8} {}", channel.table.name(), channel.name)?;
    }

    Ok(())
}

pub(crate) fn snapshot<W: Write>(out: &mut W, matrix: &SnapshotMatrix) -> std::io::Result<()> {
    writeln!(out, "# Latest records (UTC)")?;
    for source in &matrix.sources {
        let valid = source
            .valid
            .map(|vt| vt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| MISSING.to_owned());
        writeln!(out, "#   {:<9} {:<8} {}", source.tower, source.table, valid)?;
    }

    for group in &matrix.groups {
        writeln!(out)?;
        write!(out, "{:<20}", group.height)?;
        for tower in &matrix.towers {
            write!(out, " {:>10}", tower)?;
        }
        writeln!(out)?;

        for row in &group.rows {
            write!(out, "  {:<18}", row.channel.name)?;
            for cell in &row.cells {
                write!(out, " {:>10}", cell)?;
            }
            writeln!(out)?;
        }
    }

    Ok(())
}

fn opt<T: std::fmt::Display>(val: Option<T>) -> String {
    val.map(|v| v.to_string()).unwrap_or_else(|| MISSING.to_owned())
}

pub(crate) fn gusts<W: Write>(
    out: &mut W,
    tower: Tower,
    channel: &ChannelId,
    rows: &[GustRow],
) -> std::io::Result<()> {
    writeln!(out, "# {} {}", tower, channel.name)?;
    writeln!(out, "minute_utc,mean,std_dev,min,max,max_gust,count")?;

    for row in rows {
        writeln!(
            out,
            "{},{:.2},{},{:.2},{:.2},{:.2},{}",
            row.minute.format(TIME_FORMAT),
            row.mean,
            opt(row.std_dev.map(|sd| format!("{:.2}", sd))),
            row.min,
            row.max,
            row.max_gust,
            row.count
        )?;
    }

    Ok(())
}

/// One line per minute with a column for each channel.
pub(crate) fn trend<W: Write>(
    out: &mut W,
    tower: Tower,
    trends: &[(ChannelId, Vec<MinuteMean>)],
) -> std::io::Result<()> {
    let minutes: BTreeSet<_> = trends
        .iter()
        .flat_map(|(_channel, means)| means.iter().map(|m| m.minute))
        .collect();

    writeln!(out, "# {} one minute means", tower)?;
    write!(out, "minute_utc")?;
    for (channel, _means) in trends {
        write!(out, ",{}", channel.name)?;
    }
    writeln!(out)?;

    for minute in minutes {
        write!(out, "{}", minute.format(TIME_FORMAT))?;
        for (_channel, means) in trends {
            let val = means
                .binary_search_by_key(&minute, |m| m.minute)
                .ok()
                .map(|idx| format!("{:.2}", means[idx].mean));
            write!(out, ",{}", opt(val))?;
        }
        writeln!(out)?;
    }

    Ok(())
}
