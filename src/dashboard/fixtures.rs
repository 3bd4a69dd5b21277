//! Dashboard page shared by the merge tests.

pub const PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
    <h2>10-Day Career Acceleration Series</h2>
    <div class="section">
        <div class="days-grid wide">
                <!-- Day 9 -->
                <div class="day-card">
                    <div class="day-card-content">
                        <button onclick="showPasswordModal('day9', 'Old One')">Unlock Day 9 PDF</button>
                    </div>
                </div>
                <!-- Day 10 -->
                <div class="day-card">
                    <button onclick="showPasswordModal('day10', 'Old Two')">Unlock Day 10 PDF</button>
                </div>
        </div>
        <div class="footer">Day 99 is not a card</div>
    </div>
    <script>
        const passwords = {
            day9: 'ANCHOR',
            day10: 'FOCUS',
        };
        const pdfFiles = {
            day9: "Day_9_Old_One.pdf",
            day10: 'Day_10_Old_Two.pdf'
        };
    </script>
</body>
</html>
"#;
