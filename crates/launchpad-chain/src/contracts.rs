//! ABI of the contracts the client talks to.

use alloy_sol_types::sol;

sol! {
    interface IPresale {
        function startTime() external view returns (uint256);
        function endTime() external view returns (uint256);
        function whitelistDuration() external view returns (uint256);
        function claimDelay() external view returns (uint256);
        function finalized() external view returns (bool);
        function hardCap() external view returns (uint256);
        function totalRaised() external view returns (uint256);
        function tokensNeeded() external view returns (uint256);
        function contributions(address wallet) external view returns (
            uint256 contribution,
            uint256 claimable,
            uint256 claimedToken,
            bool isRefunded
        );

        function contribute() external payable;
        function claim() external;
        function refund() external;
        function finalize() external;
    }

    interface IWhitelist {
        function isWhitelisted(address wallet) external view returns (bool);
        function addToWhitelist(address wallet) external;
        function removeFromWhitelist(address wallet) external;
    }

    interface ILocker {
        function claimable(address wallet) external view returns (uint256);
        function claim() external;
        function distribute(
            string[] names,
            uint256[] amounts,
            uint256[] vestingMonths,
            uint256[] startDates
        ) external;
    }

    contract LaunchToken {
        constructor(string name, string symbol, uint256 totalSupply);
    }

    contract AllocationLocker {
        constructor(address token, address owner);
    }
}
